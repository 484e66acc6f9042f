//! SQL session store. Tokens are UUIDv7 minted at create time.

use chrono::Duration;
use leadbay_core::store::session::SessionStore;
use leadbay_types::error::StoreError;
use leadbay_types::time::{format_datetime, now, parse_datetime};
use leadbay_types::user::Session;
use sqlx::any::AnyRow;
use sqlx::Row;
use uuid::Uuid;

use super::pool::Database;
use super::{map_sqlx_error, SqlValue};

#[derive(Clone)]
pub struct SqlSessionStore {
    db: Database,
}

impl SqlSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct SessionRow {
    id: i64,
    user_id: i64,
    token: String,
    expires_at: String,
    created_at: String,
}

impl SessionRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            token: row.try_get("token")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_session(self) -> Result<Session, StoreError> {
        Ok(Session {
            id: self.id,
            user_id: self.user_id,
            token: self.token,
            expires_at: parse_datetime(&self.expires_at).map_err(StoreError::Query)?,
            created_at: parse_datetime(&self.created_at).map_err(StoreError::Query)?,
        })
    }
}

fn row_to_session(row: &AnyRow) -> Result<Session, StoreError> {
    SessionRow::from_row(row)
        .map_err(map_sqlx_error)?
        .into_session()
}

impl SessionStore for SqlSessionStore {
    async fn create(&self, user_id: i64, ttl_secs: i64) -> Result<Session, StoreError> {
        let created = now();
        let expires = created + Duration::seconds(ttl_secs);
        let token = Uuid::now_v7().to_string();
        let args = vec![
            SqlValue::Int(user_id),
            SqlValue::from(token),
            SqlValue::from(format_datetime(&expires)),
            SqlValue::from(format_datetime(&created)),
        ];

        let row = self
            .db
            .insert_and_fetch(
                "INSERT INTO sessions (user_id, token, expires_at, created_at) \
                 VALUES (?, ?, ?, ?)",
                &args,
                "sessions",
            )
            .await?;
        row_to_session(&row)
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM sessions WHERE token = ?",
                &[SqlValue::from(token)],
            )
            .await?;
        row.as_ref().map(row_to_session).transpose()
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError> {
        self.db
            .execute(
                "DELETE FROM sessions WHERE token = ?",
                &[SqlValue::from(token)],
            )
            .await?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        // RFC 3339 strings in UTC compare in timestamp order.
        self.db
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?",
                &[SqlValue::from(format_datetime(&now()))],
            )
            .await
    }
}

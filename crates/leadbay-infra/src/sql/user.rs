//! SQL user store.
//!
//! The `password_hash` column stays inside this module: rows decode into
//! the hashless domain `User`, and credential checks happen here against
//! the stored hash.

use leadbay_core::page::{Page, DEFAULT_LIST_LIMIT};
use leadbay_core::store::user::{UserFilter, UserStore};
use leadbay_types::error::StoreError;
use leadbay_types::time::{format_datetime, now, parse_datetime};
use leadbay_types::user::{CreateUser, UpdateUser, User, DEFAULT_ROLE};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::password::{hash_password, verify_password};

use super::pool::Database;
use super::query::WhereBuilder;
use super::{map_sqlx_error, SqlValue};

const SEARCH_COLUMNS: &[&str] = &["username", "email"];

#[derive(Clone)]
pub struct SqlUserStore {
    db: Database,
}

impl SqlUserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    email: Option<String>,
    role: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            email: row.try_get("email")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            role: self.role,
            created_at: parse_datetime(&self.created_at).map_err(StoreError::Query)?,
            updated_at: parse_datetime(&self.updated_at).map_err(StoreError::Query)?,
        })
    }
}

fn row_to_user(row: &AnyRow) -> Result<User, StoreError> {
    UserRow::from_row(row).map_err(map_sqlx_error)?.into_user()
}

impl UserStore for SqlUserStore {
    async fn create(&self, input: CreateUser) -> Result<User, StoreError> {
        let hash = hash_password(&input.password)?;
        let now = format_datetime(&now());
        let args = vec![
            SqlValue::from(input.username),
            SqlValue::from(hash),
            SqlValue::from(input.email),
            SqlValue::from(input.role.unwrap_or_else(|| DEFAULT_ROLE.to_string())),
            SqlValue::from(now.clone()),
            SqlValue::from(now),
        ];

        let row = self
            .db
            .insert_and_fetch(
                "INSERT INTO users (username, password_hash, email, role, created_at, \
                 updated_at) VALUES (?, ?, ?, ?, ?, ?)",
                &args,
                "users",
            )
            .await?;
        row_to_user(&row)
    }

    async fn list(&self, filter: &UserFilter) -> Result<Page<User>, StoreError> {
        let mut w = WhereBuilder::default();
        if let Some(role) = &filter.role {
            w.eq("role", role.as_str());
        }
        if let Some(term) = &filter.search {
            w.search(SEARCH_COLUMNS, term);
        }
        let clause = w.clause();

        let total = self
            .db
            .fetch_count(&format!("SELECT COUNT(*) FROM users{clause}"), w.args())
            .await?;

        let (limit, offset) = filter.page.resolve(DEFAULT_LIST_LIMIT);
        let sql = format!(
            "SELECT * FROM users{clause} ORDER BY created_at DESC, id DESC {}",
            self.db.dialect().paginate(limit, offset)
        );
        let rows = self.db.fetch_all(&sql, w.args()).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(row_to_user(row)?);
        }
        Ok(Page { items, total })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = self
            .db
            .fetch_optional("SELECT * FROM users WHERE id = ?", &[SqlValue::Int(id)])
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM users WHERE username = ?",
                &[SqlValue::from(username)],
            )
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn update(&self, id: i64, patch: UpdateUser) -> Result<Option<User>, StoreError> {
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(email) = patch.email {
            sets.push("email = ?");
            args.push(SqlValue::Text(email));
        }
        if let Some(role) = patch.role {
            sets.push("role = ?");
            args.push(SqlValue::Text(role));
        }
        if let Some(password) = patch.password {
            sets.push("password_hash = ?");
            args.push(SqlValue::Text(hash_password(&password)?));
        }

        sets.push("updated_at = ?");
        args.push(SqlValue::Text(format_datetime(&now())));
        args.push(SqlValue::Int(id));

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let affected = self.db.execute(&sql, &args).await?;
        if affected == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.db
            .execute("DELETE FROM users WHERE id = ?", &[SqlValue::Int(id)])
            .await?;
        Ok(())
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM users WHERE username = ?",
                &[SqlValue::from(username)],
            )
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let user_row = UserRow::from_row(&row).map_err(map_sqlx_error)?;
        if verify_password(password, &user_row.password_hash) {
            user_row.into_user().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::testing::test_db;

    fn make_input(username: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            password: "hunter2!".to_string(),
            email: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn test_create_applies_default_role() {
        let store = SqlUserStore::new(test_db().await);

        let user = store.create(make_input("ops")).await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.role, DEFAULT_ROLE);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = SqlUserStore::new(test_db().await);

        store.create(make_input("ops")).await.unwrap();
        let err = store.create(make_input("ops")).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let store = SqlUserStore::new(test_db().await);
        store.create(make_input("ops")).await.unwrap();

        let user = store
            .verify_credentials("ops", "hunter2!")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "ops");

        assert!(store
            .verify_credentials("ops", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("nobody", "hunter2!")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_password_changes_credentials() {
        let store = SqlUserStore::new(test_db().await);
        let user = store.create(make_input("ops")).await.unwrap();

        store
            .update(
                user.id,
                UpdateUser {
                    password: Some("new-secret".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(store
            .verify_credentials("ops", "hunter2!")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("ops", "new-secret")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let store = SqlUserStore::new(test_db().await);
        store.create(make_input("ops")).await.unwrap();

        assert!(store.get_by_username("ops").await.unwrap().is_some());
        assert!(store.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_role() {
        let store = SqlUserStore::new(test_db().await);
        store.create(make_input("alpha")).await.unwrap();
        let mut admin = make_input("beta");
        admin.role = Some("admin".to_string());
        store.create(admin).await.unwrap();

        let filter = UserFilter {
            role: Some("admin".to_string()),
            ..Default::default()
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].username, "beta");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SqlUserStore::new(test_db().await);
        let user = store.create(make_input("ops")).await.unwrap();

        store.delete(user.id).await.unwrap();
        store.delete(user.id).await.unwrap();
        assert!(store.get_by_id(user.id).await.unwrap().is_none());
    }
}

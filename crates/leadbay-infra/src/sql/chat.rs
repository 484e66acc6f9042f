//! SQL chat session store.

use leadbay_core::json;
use leadbay_core::page::{Page, DEFAULT_LIST_LIMIT};
use leadbay_core::store::chat::{ChatSessionFilter, ChatSessionStore};
use leadbay_types::chat::{ChatSession, CreateChatSession, UpdateChatSession};
use leadbay_types::error::StoreError;
use leadbay_types::time::{format_datetime, now, parse_datetime};
use sqlx::any::AnyRow;
use sqlx::Row;

use super::pool::Database;
use super::query::WhereBuilder;
use super::{map_sqlx_error, SqlValue};

const SEARCH_COLUMNS: &[&str] = &["microsite", "phone", "metadata"];

#[derive(Clone)]
pub struct SqlChatSessionStore {
    db: Database,
}

impl SqlChatSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct ChatSessionRow {
    id: i64,
    microsite: String,
    project_id: Option<String>,
    lead_id: Option<i64>,
    phone: Option<String>,
    bhk_type: Option<String>,
    conversation: Option<String>,
    metadata: Option<String>,
    location: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            microsite: row.try_get("microsite")?,
            project_id: row.try_get("project_id")?,
            lead_id: row.try_get("lead_id")?,
            phone: row.try_get("phone")?,
            bhk_type: row.try_get("bhk_type")?,
            conversation: row.try_get("conversation")?,
            metadata: row.try_get("metadata")?,
            location: row.try_get("location")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_chat_session(self) -> Result<ChatSession, StoreError> {
        Ok(ChatSession {
            id: self.id,
            microsite: self.microsite,
            project_id: self.project_id,
            lead_id: self.lead_id,
            phone: self.phone,
            bhk_type: self.bhk_type,
            conversation: json::normalize_text(self.conversation.as_deref(), &json::empty_array()),
            metadata: json::normalize_text(self.metadata.as_deref(), &json::empty_object()),
            location: self.location,
            created_at: parse_datetime(&self.created_at).map_err(StoreError::Query)?,
            updated_at: parse_datetime(&self.updated_at).map_err(StoreError::Query)?,
        })
    }
}

fn row_to_chat_session(row: &AnyRow) -> Result<ChatSession, StoreError> {
    ChatSessionRow::from_row(row)
        .map_err(map_sqlx_error)?
        .into_chat_session()
}

fn compile_filter(filter: &ChatSessionFilter) -> WhereBuilder {
    let mut w = WhereBuilder::default();
    if let Some(microsite) = &filter.microsite {
        w.eq("microsite", microsite.as_str());
    }
    if let Some(project_id) = &filter.project_id {
        w.eq("project_id", project_id.as_str());
    }
    if let Some(lead_id) = filter.lead_id {
        w.eq("lead_id", lead_id);
    }
    if let Some(term) = &filter.search {
        w.search(SEARCH_COLUMNS, term);
    }
    w.date_range(
        "created_at",
        filter.start_date.as_ref(),
        filter.end_date.as_ref(),
    );
    w
}

impl ChatSessionStore for SqlChatSessionStore {
    async fn create(&self, input: CreateChatSession) -> Result<ChatSession, StoreError> {
        let now = format_datetime(&now());
        let args = vec![
            SqlValue::from(input.microsite),
            SqlValue::from(input.project_id),
            SqlValue::from(input.lead_id),
            SqlValue::from(input.phone),
            SqlValue::from(input.bhk_type),
            SqlValue::from(json::to_db_text(
                input.conversation.as_ref(),
                &json::empty_array(),
            )),
            SqlValue::from(json::to_db_text(
                input.metadata.as_ref(),
                &json::empty_object(),
            )),
            SqlValue::from(input.location),
            SqlValue::from(now.clone()),
            SqlValue::from(now),
        ];

        let row = self
            .db
            .insert_and_fetch(
                "INSERT INTO chat_sessions (microsite, project_id, lead_id, phone, bhk_type, \
                 conversation, metadata, location, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &args,
                "chat_sessions",
            )
            .await?;
        row_to_chat_session(&row)
    }

    async fn list(&self, filter: &ChatSessionFilter) -> Result<Page<ChatSession>, StoreError> {
        let w = compile_filter(filter);
        let clause = w.clause();

        let total = self
            .db
            .fetch_count(
                &format!("SELECT COUNT(*) FROM chat_sessions{clause}"),
                w.args(),
            )
            .await?;

        let (limit, offset) = filter.page.resolve(DEFAULT_LIST_LIMIT);
        let sql = format!(
            "SELECT * FROM chat_sessions{clause} ORDER BY created_at DESC, id DESC {}",
            self.db.dialect().paginate(limit, offset)
        );
        let rows = self.db.fetch_all(&sql, w.args()).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(row_to_chat_session(row)?);
        }
        Ok(Page { items, total })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ChatSession>, StoreError> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM chat_sessions WHERE id = ?",
                &[SqlValue::Int(id)],
            )
            .await?;
        row.as_ref().map(row_to_chat_session).transpose()
    }

    async fn update(
        &self,
        id: i64,
        patch: UpdateChatSession,
    ) -> Result<Option<ChatSession>, StoreError> {
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(project_id) = patch.project_id {
            sets.push("project_id = ?");
            args.push(SqlValue::Text(project_id));
        }
        if let Some(lead_id) = patch.lead_id {
            sets.push("lead_id = ?");
            args.push(SqlValue::Int(lead_id));
        }
        if let Some(phone) = patch.phone {
            sets.push("phone = ?");
            args.push(SqlValue::Text(phone));
        }
        if let Some(bhk_type) = patch.bhk_type {
            sets.push("bhk_type = ?");
            args.push(SqlValue::Text(bhk_type));
        }
        if let Some(conversation) = &patch.conversation {
            sets.push("conversation = ?");
            args.push(SqlValue::Text(json::to_db_text(
                Some(conversation),
                &json::empty_array(),
            )));
        }
        if let Some(metadata) = &patch.metadata {
            sets.push("metadata = ?");
            args.push(SqlValue::Text(json::to_db_text(
                Some(metadata),
                &json::empty_object(),
            )));
        }
        if let Some(location) = patch.location {
            sets.push("location = ?");
            args.push(SqlValue::Text(location));
        }

        sets.push("updated_at = ?");
        args.push(SqlValue::Text(format_datetime(&now())));
        args.push(SqlValue::Int(id));

        let sql = format!("UPDATE chat_sessions SET {} WHERE id = ?", sets.join(", "));
        let affected = self.db.execute(&sql, &args).await?;
        if affected == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.db
            .execute(
                "DELETE FROM chat_sessions WHERE id = ?",
                &[SqlValue::Int(id)],
            )
            .await?;
        Ok(())
    }
}

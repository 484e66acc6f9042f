//! Chat session store trait and filter descriptor.

use chrono::{DateTime, Utc};
use leadbay_types::chat::{ChatSession, CreateChatSession, UpdateChatSession};
use leadbay_types::error::StoreError;

use crate::page::{Page, PageRequest};

/// Filter criteria for listing chat sessions. `search` covers microsite,
/// phone, and metadata text.
#[derive(Debug, Clone, Default)]
pub struct ChatSessionFilter {
    pub microsite: Option<String>,
    pub project_id: Option<String>,
    pub lead_id: Option<i64>,
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: PageRequest,
}

/// Repository trait for chat session persistence.
pub trait ChatSessionStore: Send + Sync {
    /// Create a chat session. A present `lead_id` must reference an
    /// existing lead at write time (enforced by the schema's foreign
    /// key); it is not re-validated afterwards.
    fn create(
        &self,
        input: CreateChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, StoreError>> + Send;

    fn list(
        &self,
        filter: &ChatSessionFilter,
    ) -> impl std::future::Future<Output = Result<Page<ChatSession>, StoreError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, StoreError>> + Send;

    fn update(
        &self,
        id: i64,
        patch: UpdateChatSession,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, StoreError>> + Send;

    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

//! ChatSession entity and its request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A widget chat transcript, optionally tied to a lead.
///
/// `lead_id` is a weak reference: it must point at an existing lead when
/// written (the schema's foreign key enforces that), and the schema nulls
/// it out if the lead is later deleted. Reads never re-validate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: i64,
    pub microsite: String,
    pub project_id: Option<String>,
    pub lead_id: Option<i64>,
    pub phone: Option<String>,
    pub bhk_type: Option<String>,
    pub conversation: Value,
    pub metadata: Value,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `ChatSessionStore::create`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatSession {
    pub microsite: String,
    pub project_id: Option<String>,
    pub lead_id: Option<i64>,
    pub phone: Option<String>,
    pub bhk_type: Option<String>,
    pub conversation: Option<Value>,
    pub metadata: Option<Value>,
    pub location: Option<String>,
}

/// Partial update for a chat session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChatSession {
    pub project_id: Option<String>,
    pub lead_id: Option<i64>,
    pub phone: Option<String>,
    pub bhk_type: Option<String>,
    pub conversation: Option<Value>,
    pub metadata: Option<Value>,
    pub location: Option<String>,
}

impl UpdateChatSession {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.lead_id.is_none()
            && self.phone.is_none()
            && self.bhk_type.is_none()
            && self.conversation.is_none()
            && self.metadata.is_none()
            && self.location.is_none()
    }
}

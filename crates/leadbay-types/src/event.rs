//! Event entity and its request DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A widget analytics event. Immutable once created: the store exposes
/// no update operation for events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub event_type: String,
    pub project_id: String,
    pub microsite: Option<String>,
    pub payload: Value,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for `EventStore::create`. `payload` defaults to `{}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub event_type: String,
    pub project_id: String,
    pub microsite: Option<String>,
    pub payload: Option<Value>,
    pub location: Option<String>,
}

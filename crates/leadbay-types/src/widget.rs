//! WidgetConfig entity and its upsert DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-project widget display configuration. One row per `project_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub id: i64,
    pub project_id: String,
    pub widget_title: String,
    pub welcome_message: String,
    pub primary_color: String,
    pub position: String,
    pub enabled: bool,
    pub property_info: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display defaults applied when an upsert omits a field and no row
/// exists yet.
pub const DEFAULT_WIDGET_TITLE: &str = "Chat with us";
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi! How can we help you today?";
pub const DEFAULT_PRIMARY_COLOR: &str = "#2563eb";
pub const DEFAULT_POSITION: &str = "bottom-right";

/// Input for `WidgetConfigStore::upsert`. Fields left `None` keep the
/// existing value, or take the display default when the row is created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertWidgetConfig {
    pub widget_title: Option<String>,
    pub welcome_message: Option<String>,
    pub primary_color: Option<String>,
    pub position: Option<String>,
    pub enabled: Option<bool>,
    pub property_info: Option<Value>,
}

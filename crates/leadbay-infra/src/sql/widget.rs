//! SQL widget configuration store.
//!
//! One row per `project_id`. `enabled` is stored as an integer 0/1
//! because the neutral driver has no portable boolean type.

use leadbay_core::json;
use leadbay_core::store::widget::WidgetConfigStore;
use leadbay_types::error::StoreError;
use leadbay_types::time::{format_datetime, now, parse_datetime};
use leadbay_types::widget::{
    UpsertWidgetConfig, WidgetConfig, DEFAULT_POSITION, DEFAULT_PRIMARY_COLOR,
    DEFAULT_WELCOME_MESSAGE, DEFAULT_WIDGET_TITLE,
};
use sqlx::any::AnyRow;
use sqlx::Row;

use super::pool::Database;
use super::{map_sqlx_error, SqlValue};

#[derive(Clone)]
pub struct SqlWidgetConfigStore {
    db: Database,
}

impl SqlWidgetConfigStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct WidgetConfigRow {
    id: i64,
    project_id: String,
    widget_title: String,
    welcome_message: String,
    primary_color: String,
    position: String,
    enabled: i64,
    property_info: Option<String>,
    created_at: String,
    updated_at: String,
}

impl WidgetConfigRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            widget_title: row.try_get("widget_title")?,
            welcome_message: row.try_get("welcome_message")?,
            primary_color: row.try_get("primary_color")?,
            position: row.try_get("position")?,
            enabled: row.try_get("enabled")?,
            property_info: row.try_get("property_info")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_config(self) -> Result<WidgetConfig, StoreError> {
        Ok(WidgetConfig {
            id: self.id,
            project_id: self.project_id,
            widget_title: self.widget_title,
            welcome_message: self.welcome_message,
            primary_color: self.primary_color,
            position: self.position,
            enabled: self.enabled != 0,
            property_info: json::normalize_text(
                self.property_info.as_deref(),
                &json::empty_object(),
            ),
            created_at: parse_datetime(&self.created_at).map_err(StoreError::Query)?,
            updated_at: parse_datetime(&self.updated_at).map_err(StoreError::Query)?,
        })
    }
}

fn row_to_config(row: &AnyRow) -> Result<WidgetConfig, StoreError> {
    WidgetConfigRow::from_row(row)
        .map_err(map_sqlx_error)?
        .into_config()
}

impl SqlWidgetConfigStore {
    async fn insert(
        &self,
        project_id: &str,
        input: &UpsertWidgetConfig,
    ) -> Result<WidgetConfig, StoreError> {
        let now = format_datetime(&now());
        let args = vec![
            SqlValue::from(project_id),
            SqlValue::from(
                input
                    .widget_title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WIDGET_TITLE.to_string()),
            ),
            SqlValue::from(
                input
                    .welcome_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string()),
            ),
            SqlValue::from(
                input
                    .primary_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            ),
            SqlValue::from(
                input
                    .position
                    .clone()
                    .unwrap_or_else(|| DEFAULT_POSITION.to_string()),
            ),
            SqlValue::Int(i64::from(input.enabled.unwrap_or(true))),
            SqlValue::from(json::to_db_text(
                input.property_info.as_ref(),
                &json::empty_object(),
            )),
            SqlValue::from(now.clone()),
            SqlValue::from(now),
        ];

        let row = self
            .db
            .insert_and_fetch(
                "INSERT INTO widget_configs (project_id, widget_title, welcome_message, \
                 primary_color, position, enabled, property_info, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &args,
                "widget_configs",
            )
            .await?;
        row_to_config(&row)
    }

    async fn update_existing(
        &self,
        project_id: &str,
        input: &UpsertWidgetConfig,
    ) -> Result<Option<WidgetConfig>, StoreError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(widget_title) = &input.widget_title {
            sets.push("widget_title = ?");
            args.push(SqlValue::from(widget_title.clone()));
        }
        if let Some(welcome_message) = &input.welcome_message {
            sets.push("welcome_message = ?");
            args.push(SqlValue::from(welcome_message.clone()));
        }
        if let Some(primary_color) = &input.primary_color {
            sets.push("primary_color = ?");
            args.push(SqlValue::from(primary_color.clone()));
        }
        if let Some(position) = &input.position {
            sets.push("position = ?");
            args.push(SqlValue::from(position.clone()));
        }
        if let Some(enabled) = input.enabled {
            sets.push("enabled = ?");
            args.push(SqlValue::Int(i64::from(enabled)));
        }
        if let Some(property_info) = &input.property_info {
            sets.push("property_info = ?");
            args.push(SqlValue::Text(json::to_db_text(
                Some(property_info),
                &json::empty_object(),
            )));
        }

        if sets.is_empty() {
            return self.get_by_project(project_id).await;
        }

        sets.push("updated_at = ?");
        args.push(SqlValue::Text(format_datetime(&now())));
        args.push(SqlValue::from(project_id));

        let sql = format!(
            "UPDATE widget_configs SET {} WHERE project_id = ?",
            sets.join(", ")
        );
        let affected = self.db.execute(&sql, &args).await?;
        if affected == 0 {
            return Ok(None);
        }
        self.get_by_project(project_id).await
    }
}

impl WidgetConfigStore for SqlWidgetConfigStore {
    async fn get_by_project(&self, project_id: &str) -> Result<Option<WidgetConfig>, StoreError> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM widget_configs WHERE project_id = ?",
                &[SqlValue::from(project_id)],
            )
            .await?;
        row.as_ref().map(row_to_config).transpose()
    }

    async fn upsert(
        &self,
        project_id: &str,
        input: UpsertWidgetConfig,
    ) -> Result<WidgetConfig, StoreError> {
        if let Some(config) = self.update_existing(project_id, &input).await? {
            return Ok(config);
        }

        // No row yet. A concurrent upsert can still win the insert race
        // on the unique project_id, in which case we fall back to the
        // update path.
        match self.insert(project_id, &input).await {
            Ok(config) => Ok(config),
            Err(StoreError::Query(_)) => self
                .update_existing(project_id, &input)
                .await?
                .ok_or_else(|| {
                    StoreError::Query(format!(
                        "widget config upsert failed for project {project_id}"
                    ))
                }),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::testing::test_db;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = SqlWidgetConfigStore::new(test_db().await);
        assert!(store.get_by_project("proj-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_with_defaults() {
        let store = SqlWidgetConfigStore::new(test_db().await);

        let config = store
            .upsert("proj-1", UpsertWidgetConfig::default())
            .await
            .unwrap();
        assert_eq!(config.project_id, "proj-1");
        assert_eq!(config.widget_title, DEFAULT_WIDGET_TITLE);
        assert_eq!(config.welcome_message, DEFAULT_WELCOME_MESSAGE);
        assert_eq!(config.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(config.position, DEFAULT_POSITION);
        assert!(config.enabled);
        assert_eq!(config.property_info, json!({}));
    }

    #[tokio::test]
    async fn test_upsert_updates_only_present_fields() {
        let store = SqlWidgetConfigStore::new(test_db().await);

        store
            .upsert(
                "proj-1",
                UpsertWidgetConfig {
                    widget_title: Some("Talk to sales".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let config = store
            .upsert(
                "proj-1",
                UpsertWidgetConfig {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(config.widget_title, "Talk to sales");
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_project() {
        let store = SqlWidgetConfigStore::new(test_db().await);

        let first = store
            .upsert("proj-1", UpsertWidgetConfig::default())
            .await
            .unwrap();
        let second = store
            .upsert(
                "proj-1",
                UpsertWidgetConfig {
                    primary_color: Some("#ff0000".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.primary_color, "#ff0000");
    }

    #[tokio::test]
    async fn test_projects_are_isolated() {
        let store = SqlWidgetConfigStore::new(test_db().await);

        store
            .upsert(
                "proj-1",
                UpsertWidgetConfig {
                    widget_title: Some("One".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .upsert(
                "proj-2",
                UpsertWidgetConfig {
                    widget_title: Some("Two".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let one = store.get_by_project("proj-1").await.unwrap().unwrap();
        let two = store.get_by_project("proj-2").await.unwrap().unwrap();
        assert_eq!(one.widget_title, "One");
        assert_eq!(two.widget_title, "Two");
    }

    #[tokio::test]
    async fn test_property_info_round_trips() {
        let store = SqlWidgetConfigStore::new(test_db().await);

        let config = store
            .upsert(
                "proj-1",
                UpsertWidgetConfig {
                    property_info: Some(json!({"name": "Lakeside Towers", "units": 120})),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            config.property_info,
            json!({"name": "Lakeside Towers", "units": 120})
        );
    }
}

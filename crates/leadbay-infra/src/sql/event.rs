//! SQL event store. Events are append-only; there is no update path.

use leadbay_core::json;
use leadbay_core::page::{Page, DEFAULT_EVENT_LIMIT};
use leadbay_core::store::event::{EventFilter, EventStore};
use leadbay_types::error::StoreError;
use leadbay_types::event::{CreateEvent, Event};
use leadbay_types::time::{format_datetime, now, parse_datetime};
use sqlx::any::AnyRow;
use sqlx::Row;

use super::pool::Database;
use super::query::WhereBuilder;
use super::{map_sqlx_error, SqlValue};

#[derive(Clone)]
pub struct SqlEventStore {
    db: Database,
}

impl SqlEventStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct EventRow {
    id: i64,
    event_type: String,
    project_id: String,
    microsite: Option<String>,
    payload: Option<String>,
    location: Option<String>,
    created_at: String,
}

impl EventRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            event_type: row.try_get("event_type")?,
            project_id: row.try_get("project_id")?,
            microsite: row.try_get("microsite")?,
            payload: row.try_get("payload")?,
            location: row.try_get("location")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_event(self) -> Result<Event, StoreError> {
        Ok(Event {
            id: self.id,
            event_type: self.event_type,
            project_id: self.project_id,
            microsite: self.microsite,
            payload: json::normalize_text(self.payload.as_deref(), &json::empty_object()),
            location: self.location,
            created_at: parse_datetime(&self.created_at).map_err(StoreError::Query)?,
        })
    }
}

fn row_to_event(row: &AnyRow) -> Result<Event, StoreError> {
    EventRow::from_row(row).map_err(map_sqlx_error)?.into_event()
}

fn compile_filter(filter: &EventFilter) -> WhereBuilder {
    let mut w = WhereBuilder::default();
    if let Some(event_type) = &filter.event_type {
        w.eq("event_type", event_type.as_str());
    }
    if let Some(project_id) = &filter.project_id {
        w.eq("project_id", project_id.as_str());
    }
    if let Some(microsite) = &filter.microsite {
        w.eq("microsite", microsite.as_str());
    }
    w.date_range(
        "created_at",
        filter.start_date.as_ref(),
        filter.end_date.as_ref(),
    );
    w
}

impl EventStore for SqlEventStore {
    async fn create(&self, input: CreateEvent) -> Result<Event, StoreError> {
        let args = vec![
            SqlValue::from(input.event_type),
            SqlValue::from(input.project_id),
            SqlValue::from(input.microsite),
            SqlValue::from(json::to_db_text(
                input.payload.as_ref(),
                &json::empty_object(),
            )),
            SqlValue::from(input.location),
            SqlValue::from(format_datetime(&now())),
        ];

        let row = self
            .db
            .insert_and_fetch(
                "INSERT INTO events (event_type, project_id, microsite, payload, location, \
                 created_at) VALUES (?, ?, ?, ?, ?, ?)",
                &args,
                "events",
            )
            .await?;
        row_to_event(&row)
    }

    async fn list(&self, filter: &EventFilter) -> Result<Page<Event>, StoreError> {
        let w = compile_filter(filter);
        let clause = w.clause();

        let total = self
            .db
            .fetch_count(&format!("SELECT COUNT(*) FROM events{clause}"), w.args())
            .await?;

        let (limit, offset) = filter.page.resolve(DEFAULT_EVENT_LIMIT);
        let sql = format!(
            "SELECT * FROM events{clause} ORDER BY created_at DESC, id DESC {}",
            self.db.dialect().paginate(limit, offset)
        );
        let rows = self.db.fetch_all(&sql, w.args()).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(row_to_event(row)?);
        }
        Ok(Page { items, total })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>, StoreError> {
        let row = self
            .db
            .fetch_optional("SELECT * FROM events WHERE id = ?", &[SqlValue::Int(id)])
            .await?;
        row.as_ref().map(row_to_event).transpose()
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.db
            .execute("DELETE FROM events WHERE id = ?", &[SqlValue::Int(id)])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::testing::test_db;
    use serde_json::json;

    fn make_input(event_type: &str, project_id: &str) -> CreateEvent {
        CreateEvent {
            event_type: event_type.to_string(),
            project_id: project_id.to_string(),
            microsite: None,
            payload: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_payload_to_empty_object() {
        let store = SqlEventStore::new(test_db().await);

        let event = store.create(make_input("widget_open", "proj-1")).await.unwrap();
        assert!(event.id > 0);
        assert_eq!(event.payload, json!({}));
    }

    #[tokio::test]
    async fn test_payload_round_trips() {
        let store = SqlEventStore::new(test_db().await);

        let mut input = make_input("cta_click", "proj-1");
        input.payload = Some(json!({"button": "book-visit"}));
        let event = store.create(input).await.unwrap();

        let found = store.get_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(found.payload, json!({"button": "book-visit"}));
    }

    #[tokio::test]
    async fn test_list_filters_by_type_and_project() {
        let store = SqlEventStore::new(test_db().await);
        store.create(make_input("widget_open", "proj-1")).await.unwrap();
        store.create(make_input("widget_open", "proj-2")).await.unwrap();
        store.create(make_input("cta_click", "proj-1")).await.unwrap();

        let filter = EventFilter {
            event_type: Some("widget_open".to_string()),
            project_id: Some("proj-1".to_string()),
            ..Default::default()
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].event_type, "widget_open");
        assert_eq!(page.items[0].project_id, "proj-1");
    }

    #[tokio::test]
    async fn test_list_total_independent_of_page_bounds() {
        let store = SqlEventStore::new(test_db().await);
        for _ in 0..4 {
            store.create(make_input("widget_open", "proj-1")).await.unwrap();
        }

        let filter = EventFilter {
            page: leadbay_core::page::PageRequest {
                limit: Some(3),
                skip: Some(0),
            },
            ..Default::default()
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 4);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SqlEventStore::new(test_db().await);
        let event = store.create(make_input("widget_open", "proj-1")).await.unwrap();

        store.delete(event.id).await.unwrap();
        store.delete(event.id).await.unwrap();
        assert!(store.get_by_id(event.id).await.unwrap().is_none());
    }
}

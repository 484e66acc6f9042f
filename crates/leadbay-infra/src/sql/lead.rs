//! SQL lead store.
//!
//! Implements `LeadStore` from `leadbay-core` over the shared
//! [`Database`]: private row struct for column mapping, WHERE
//! compilation through [`WhereBuilder`], JSON columns normalized on
//! read.

use leadbay_core::json;
use leadbay_core::page::{Page, DEFAULT_LIST_LIMIT};
use leadbay_core::store::lead::{LeadFilter, LeadStore};
use leadbay_types::error::StoreError;
use leadbay_types::lead::{CreateLead, Lead, LeadStatus, UpdateLead};
use leadbay_types::time::{format_datetime, now, parse_datetime};
use sqlx::any::AnyRow;
use sqlx::Row;

use super::pool::Database;
use super::query::WhereBuilder;
use super::{map_sqlx_error, SqlValue};

/// Columns the `search` filter scans.
const SEARCH_COLUMNS: &[&str] = &["microsite", "phone", "metadata"];

#[derive(Clone)]
pub struct SqlLeadStore {
    db: Database,
}

impl SqlLeadStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct LeadRow {
    id: i64,
    phone: Option<String>,
    bhk_type: String,
    bhk: Option<String>,
    microsite: String,
    lead_source: String,
    status: String,
    metadata: Option<String>,
    conversation: Option<String>,
    location: Option<String>,
    created_at: String,
    updated_at: String,
}

impl LeadRow {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            phone: row.try_get("phone")?,
            bhk_type: row.try_get("bhk_type")?,
            bhk: row.try_get("bhk")?,
            microsite: row.try_get("microsite")?,
            lead_source: row.try_get("lead_source")?,
            status: row.try_get("status")?,
            metadata: row.try_get("metadata")?,
            conversation: row.try_get("conversation")?,
            location: row.try_get("location")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_lead(self) -> Result<Lead, StoreError> {
        let status: LeadStatus = self.status.parse().map_err(StoreError::Query)?;
        Ok(Lead {
            id: self.id,
            phone: self.phone,
            bhk_type: self.bhk_type,
            bhk: self.bhk,
            microsite: self.microsite,
            lead_source: self.lead_source,
            status,
            metadata: json::normalize_text(self.metadata.as_deref(), &json::empty_object()),
            conversation: json::normalize_text(self.conversation.as_deref(), &json::empty_array()),
            location: self.location,
            created_at: parse_datetime(&self.created_at).map_err(StoreError::Query)?,
            updated_at: parse_datetime(&self.updated_at).map_err(StoreError::Query)?,
        })
    }
}

fn row_to_lead(row: &AnyRow) -> Result<Lead, StoreError> {
    LeadRow::from_row(row).map_err(map_sqlx_error)?.into_lead()
}

fn compile_filter(filter: &LeadFilter) -> WhereBuilder {
    let mut w = WhereBuilder::default();
    if let Some(microsite) = &filter.microsite {
        w.eq("microsite", microsite.as_str());
    }
    if let Some(status) = &filter.status {
        w.eq("status", status.to_string());
    }
    if let Some(phone) = &filter.phone {
        w.eq("phone", phone.as_str());
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

impl LeadStore for SqlLeadStore {
    async fn create(&self, input: CreateLead) -> Result<Lead, StoreError> {
        let now = format_datetime(&now());
        let status = input.status.unwrap_or_default().to_string();
        let lead_source = input
            .lead_source
            .unwrap_or_else(|| "ChatWidget".to_string());
        let args = vec![
            SqlValue::from(input.phone),
            SqlValue::from(input.bhk_type),
            SqlValue::from(input.bhk),
            SqlValue::from(input.microsite),
            SqlValue::from(lead_source),
            SqlValue::from(status),
            SqlValue::from(json::to_db_text(
                input.metadata.as_ref(),
                &json::empty_object(),
            )),
            SqlValue::from(json::to_db_text(
                input.conversation.as_ref(),
                &json::empty_array(),
            )),
            SqlValue::from(input.location),
            SqlValue::from(now.clone()),
            SqlValue::from(now),
        ];

        let row = self
            .db
            .insert_and_fetch(
                "INSERT INTO leads (phone, bhk_type, bhk, microsite, lead_source, status, \
                 metadata, conversation, location, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &args,
                "leads",
            )
            .await?;
        row_to_lead(&row)
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Page<Lead>, StoreError> {
        let w = compile_filter(filter);
        let clause = w.clause();

        let total = self
            .db
            .fetch_count(&format!("SELECT COUNT(*) FROM leads{clause}"), w.args())
            .await?;

        let (limit, offset) = filter.page.resolve(DEFAULT_LIST_LIMIT);
        let sql = format!(
            "SELECT * FROM leads{clause} ORDER BY created_at DESC, id DESC {}",
            self.db.dialect().paginate(limit, offset)
        );
        let rows = self.db.fetch_all(&sql, w.args()).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(row_to_lead(row)?);
        }
        Ok(Page { items, total })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>, StoreError> {
        let row = self
            .db
            .fetch_optional("SELECT * FROM leads WHERE id = ?", &[SqlValue::Int(id)])
            .await?;
        row.as_ref().map(row_to_lead).transpose()
    }

    async fn update(&self, id: i64, patch: UpdateLead) -> Result<Option<Lead>, StoreError> {
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        if let Some(phone) = patch.phone {
            sets.push("phone = ?");
            args.push(SqlValue::Text(phone));
        }
        if let Some(bhk_type) = patch.bhk_type {
            sets.push("bhk_type = ?");
            args.push(SqlValue::Text(bhk_type));
        }
        if let Some(bhk) = patch.bhk {
            sets.push("bhk = ?");
            args.push(SqlValue::Text(bhk));
        }
        if let Some(lead_source) = patch.lead_source {
            sets.push("lead_source = ?");
            args.push(SqlValue::Text(lead_source));
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            args.push(SqlValue::Text(status.to_string()));
        }
        if let Some(metadata) = &patch.metadata {
            sets.push("metadata = ?");
            args.push(SqlValue::Text(json::to_db_text(
                Some(metadata),
                &json::empty_object(),
            )));
        }
        if let Some(conversation) = &patch.conversation {
            sets.push("conversation = ?");
            args.push(SqlValue::Text(json::to_db_text(
                Some(conversation),
                &json::empty_array(),
            )));
        }
        if let Some(location) = patch.location {
            sets.push("location = ?");
            args.push(SqlValue::Text(location));
        }

        sets.push("updated_at = ?");
        args.push(SqlValue::Text(format_datetime(&now())));
        args.push(SqlValue::Int(id));

        let sql = format!("UPDATE leads SET {} WHERE id = ?", sets.join(", "));
        let affected = self.db.execute(&sql, &args).await?;
        if affected == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        // Idempotent: deleting an absent id is a success, not an error.
        self.db
            .execute("DELETE FROM leads WHERE id = ?", &[SqlValue::Int(id)])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::testing::test_db;
    use leadbay_core::page::PageRequest;
    use serde_json::json;

    fn make_input(microsite: &str) -> CreateLead {
        CreateLead {
            phone: None,
            bhk_type: "2BHK".to_string(),
            bhk: None,
            microsite: microsite.to_string(),
            lead_source: None,
            status: None,
            metadata: None,
            conversation: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let store = SqlLeadStore::new(test_db().await);

        let lead = store.create(make_input("site-a")).await.unwrap();
        assert!(lead.id > 0);
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.lead_source, "ChatWidget");
        assert_eq!(lead.metadata, json!({}));
        assert_eq!(lead.conversation, json!([]));
        assert_eq!(lead.created_at, lead.updated_at);
    }

    #[tokio::test]
    async fn test_get_by_id_round_trips_json() {
        let store = SqlLeadStore::new(test_db().await);

        let mut input = make_input("site-a");
        input.metadata = Some(json!({"utm": "campaign-7"}));
        input.conversation = Some(json!([{"role": "user", "text": "hi"}]));
        let created = store.create(input).await.unwrap();

        let found = store.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.metadata, json!({"utm": "campaign-7"}));
        assert_eq!(found.conversation, json!([{"role": "user", "text": "hi"}]));
    }

    #[tokio::test]
    async fn test_get_absent_returns_none() {
        let store = SqlLeadStore::new(test_db().await);
        assert!(store.get_by_id(99_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_total_independent_of_page_bounds() {
        let store = SqlLeadStore::new(test_db().await);
        for _ in 0..5 {
            store.create(make_input("site-a")).await.unwrap();
        }
        store.create(make_input("site-b")).await.unwrap();

        let filter = LeadFilter {
            microsite: Some("site-a".to_string()),
            page: PageRequest {
                limit: Some(2),
                skip: Some(0),
            },
            ..Default::default()
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);

        // Same filter, different bounds: total must not move.
        let filter = LeadFilter {
            microsite: Some("site-a".to_string()),
            page: PageRequest {
                limit: Some(100),
                skip: Some(4),
            },
            ..Default::default()
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = SqlLeadStore::new(test_db().await);
        let lead = store.create(make_input("site-a")).await.unwrap();
        store.create(make_input("site-a")).await.unwrap();
        store
            .update(
                lead.id,
                UpdateLead {
                    status: Some(LeadStatus::Qualified),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let filter = LeadFilter {
            status: Some(LeadStatus::Qualified),
            ..Default::default()
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, lead.id);
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive() {
        let store = SqlLeadStore::new(test_db().await);
        let mut input = make_input("Lakeside-Towers");
        input.phone = Some("+91-98765".to_string());
        store.create(input).await.unwrap();
        store.create(make_input("other-site")).await.unwrap();

        let filter = LeadFilter {
            search: Some("LAKESIDE".to_string()),
            ..Default::default()
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].microsite, "Lakeside-Towers");
    }

    #[tokio::test]
    async fn test_update_rewrites_only_present_fields() {
        let store = SqlLeadStore::new(test_db().await);
        let mut input = make_input("site-a");
        input.phone = Some("12345".to_string());
        let lead = store.create(input).await.unwrap();

        let updated = store
            .update(
                lead.id,
                UpdateLead {
                    status: Some(LeadStatus::Contacted),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, LeadStatus::Contacted);
        assert_eq!(updated.phone.as_deref(), Some("12345"));
        assert_eq!(updated.bhk_type, "2BHK");
    }

    #[tokio::test]
    async fn test_empty_update_is_a_noop() {
        let store = SqlLeadStore::new(test_db().await);
        let lead = store.create(make_input("site-a")).await.unwrap();

        let after = store
            .update(lead.id, UpdateLead::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.updated_at, lead.updated_at);

        let fetched = store.get_by_id(lead.id).await.unwrap().unwrap();
        assert_eq!(after.updated_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_update_absent_returns_none() {
        let store = SqlLeadStore::new(test_db().await);
        let result = store
            .update(
                99_999,
                UpdateLead {
                    status: Some(LeadStatus::Closed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SqlLeadStore::new(test_db().await);
        let lead = store.create(make_input("site-a")).await.unwrap();

        store.delete(lead.id).await.unwrap();
        assert!(store.get_by_id(lead.id).await.unwrap().is_none());
        // Deleting again, and deleting an id that never existed, succeed.
        store.delete(lead.id).await.unwrap();
        store.delete(99_999).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = SqlLeadStore::new(test_db().await);

        let mut inputs = Vec::new();
        for i in 0..8 {
            let mut input = make_input(&format!("site-{i}"));
            input.phone = Some(format!("phone-{i}"));
            inputs.push(input);
        }

        let created = futures_join_all(inputs.into_iter().map(|input| {
            let store = store.clone();
            async move { store.create(input).await.unwrap() }
        }))
        .await;

        let mut ids: Vec<i64> = created.iter().map(|l| l.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8, "ids must be distinct");

        // Each read-back matched the data that insert wrote: no
        // cross-talk between concurrent last-insert-id fetches.
        for lead in &created {
            let suffix = lead.microsite.strip_prefix("site-").unwrap();
            assert_eq!(lead.phone.as_deref(), Some(format!("phone-{suffix}").as_str()));
        }
    }

    /// Minimal join-all to avoid pulling futures-util into dev-deps.
    async fn futures_join_all<F, T>(futures: impl IntoIterator<Item = F>) -> Vec<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handles: Vec<_> = futures.into_iter().map(tokio::spawn).collect();
        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    }
}

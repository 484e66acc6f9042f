//! Event store trait and filter descriptor.

use chrono::{DateTime, Utc};
use leadbay_types::error::StoreError;
use leadbay_types::event::{CreateEvent, Event};

use crate::page::{Page, PageRequest};

/// Filter criteria for listing events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<String>,
    pub project_id: Option<String>,
    pub microsite: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: PageRequest,
}

/// Repository trait for event persistence. Events are immutable once
/// created, so there is no update operation.
pub trait EventStore: Send + Sync {
    fn create(
        &self,
        input: CreateEvent,
    ) -> impl std::future::Future<Output = Result<Event, StoreError>> + Send;

    fn list(
        &self,
        filter: &EventFilter,
    ) -> impl std::future::Future<Output = Result<Page<Event>, StoreError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Event>, StoreError>> + Send;

    /// Delete an event. Deleting an absent id succeeds.
    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

//! Lead store trait and filter descriptor.

use chrono::{DateTime, Utc};
use leadbay_types::error::StoreError;
use leadbay_types::lead::{CreateLead, Lead, LeadStatus, UpdateLead};

use crate::page::{Page, PageRequest};

/// Filter criteria for listing leads.
///
/// All present filters combine with AND. `search` matches a
/// case-insensitive substring across microsite, phone, and metadata
/// text. Results are always ordered by creation time, descending.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub microsite: Option<String>,
    pub status: Option<LeadStatus>,
    pub phone: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: PageRequest,
}

/// Repository trait for lead persistence.
pub trait LeadStore: Send + Sync {
    /// Create a lead, applying entity defaults for absent fields.
    fn create(
        &self,
        input: CreateLead,
    ) -> impl std::future::Future<Output = Result<Lead, StoreError>> + Send;

    /// List leads matching the filter, newest first, with the total
    /// match count for the same predicate.
    fn list(
        &self,
        filter: &LeadFilter,
    ) -> impl std::future::Future<Output = Result<Page<Lead>, StoreError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Lead>, StoreError>> + Send;

    /// Rewrite only the fields present in the patch. An empty patch is a
    /// no-op returning the current row; an absent id returns `None`.
    fn update(
        &self,
        id: i64,
        patch: UpdateLead,
    ) -> impl std::future::Future<Output = Result<Option<Lead>, StoreError>> + Send;

    /// Delete a lead. Deleting an absent id succeeds.
    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

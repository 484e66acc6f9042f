//! Widget configuration store trait.

use leadbay_types::error::StoreError;
use leadbay_types::widget::{UpsertWidgetConfig, WidgetConfig};

/// Repository trait for per-project widget configuration. One row per
/// `project_id`, written with upsert semantics.
pub trait WidgetConfigStore: Send + Sync {
    fn get_by_project(
        &self,
        project_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<WidgetConfig>, StoreError>> + Send;

    /// Update the row for `project_id`, creating it with display
    /// defaults if missing. Fields left `None` keep their current value.
    fn upsert(
        &self,
        project_id: &str,
        input: UpsertWidgetConfig,
    ) -> impl std::future::Future<Output = Result<WidgetConfig, StoreError>> + Send;
}

//! Timestamp helpers shared by every backend.
//!
//! Timestamps are persisted as RFC 3339 TEXT columns. UTC RFC 3339 strings
//! compare lexicographically in chronological order, which is what the
//! fixed `ORDER BY created_at DESC` contract and the date-range filters
//! rely on.

use chrono::{DateTime, Utc};

/// Current time, UTC.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render a timestamp the way every backend stores it.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse a stored timestamp back into its structured form.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid datetime '{s}': {e}"))
}

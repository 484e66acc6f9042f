//! Pagination bounds and clamping.
//!
//! Every list operation takes a `PageRequest` and returns a `Page`. The
//! clamping rules are a fixed contract: `limit` resolves into [1, 1000]
//! with a per-entity default, `skip` resolves to >= 0 with default 0, and
//! malformed or absent values fall back to the defaults instead of
//! erroring. `total` is always computed from the same filter predicate,
//! independent of limit/skip.

use serde::Serialize;

/// Hard ceiling on page size.
pub const MAX_LIMIT: i64 = 1000;

/// Default page size for lead, chat-session, and user listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Default page size for event listings.
pub const DEFAULT_EVENT_LIMIT: i64 = 100;

/// Requested pagination bounds, before clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl PageRequest {
    /// Build from raw query-string values. Non-numeric text becomes
    /// `None`, which `resolve` turns into the defaults.
    pub fn from_raw(limit: Option<&str>, skip: Option<&str>) -> Self {
        Self {
            limit: limit.and_then(|s| s.trim().parse().ok()),
            skip: skip.and_then(|s| s.trim().parse().ok()),
        }
    }

    /// Clamp into final `(limit, offset)` bounds.
    ///
    /// A limit of zero or less falls back to `default_limit`; anything
    /// above `MAX_LIMIT` is capped there. Negative skip resolves to 0.
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        let limit = match self.limit {
            Some(n) if n > MAX_LIMIT => MAX_LIMIT,
            Some(n) if n >= 1 => n,
            _ => default_limit,
        };
        let offset = match self.skip {
            Some(n) if n > 0 => n,
            _ => 0,
        };
        (limit, offset)
    }
}

/// One page of results plus the total match count for the same filter.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

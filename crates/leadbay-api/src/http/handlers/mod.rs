//! Request handlers, one module per resource.

pub mod auth;
pub mod chat;
pub mod event;
pub mod lead;
pub mod widget;

/// Parse a path id, rejecting non-numeric values uniformly.
pub(crate) fn parse_id(raw: &str) -> Result<i64, crate::http::error::AppError> {
    raw.parse()
        .map_err(|_| crate::http::error::AppError::Validation("id must be an integer".to_string()))
}

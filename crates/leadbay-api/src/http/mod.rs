//! HTTP surface: router, envelope responses, error mapping, auth
//! extractor, and the per-entity handlers.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;

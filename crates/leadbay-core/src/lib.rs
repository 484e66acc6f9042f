//! Store contracts and engine-neutral query logic for Leadbay.
//!
//! Defines the entity store traits (native async fn in traits), the
//! filter descriptors they consume, pagination clamping, and JSON column
//! normalization. Implementations live in `leadbay-infra`: one SQL
//! backend parameterized by dialect, and a JSON-file fallback.

pub mod json;
pub mod page;
pub mod store;

//! Shared domain types for Leadbay.
//!
//! Entities persisted by the storage layer (Lead, ChatSession, Event,
//! WidgetConfig, User, Session), the request DTOs consumed by the store
//! traits, and the storage error taxonomy. No database dependency here;
//! the store traits live in `leadbay-core` and their implementations in
//! `leadbay-infra`.

pub mod chat;
pub mod error;
pub mod event;
pub mod lead;
pub mod time;
pub mod user;
pub mod widget;

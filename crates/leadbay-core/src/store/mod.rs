//! Entity store traits.
//!
//! One trait per entity, consumed by the routing layer through the
//! [`Backend`] bundle. Trait definitions use native async fn in traits
//! (RPITIT, Rust 2024 edition); implementations live in leadbay-infra.

pub mod chat;
pub mod event;
pub mod lead;
pub mod session;
pub mod user;
pub mod widget;

pub use chat::{ChatSessionFilter, ChatSessionStore};
pub use event::{EventFilter, EventStore};
pub use lead::{LeadFilter, LeadStore};
pub use session::SessionStore;
pub use user::{UserFilter, UserStore};
pub use widget::WidgetConfigStore;

/// A full set of entity stores over one storage backend.
///
/// The composition root picks the backend once at startup (SQL or file
/// fallback) and the HTTP layer stays generic over this trait, so there
/// is exactly one code path per operation regardless of engine.
pub trait Backend: Clone + Send + Sync + 'static {
    type Leads: LeadStore;
    type Chats: ChatSessionStore;
    type Events: EventStore;
    type Users: UserStore;
    type Sessions: SessionStore;
    type Widgets: WidgetConfigStore;

    fn leads(&self) -> &Self::Leads;
    fn chats(&self) -> &Self::Chats;
    fn events(&self) -> &Self::Events;
    fn users(&self) -> &Self::Users;
    fn sessions(&self) -> &Self::Sessions;
    fn widgets(&self) -> &Self::Widgets;
}

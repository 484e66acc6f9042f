//! SQL backend: one store implementation per entity over the `sqlx::Any`
//! driver, parameterized by [`dialect::Dialect`] instead of duplicated
//! per engine.

pub mod chat;
pub mod dialect;
pub mod event;
pub mod lead;
pub mod pool;
pub mod query;
pub mod schema;
pub mod session;
pub mod user;
pub mod widget;

use leadbay_core::store::Backend;
use leadbay_types::error::StoreError;

pub use dialect::Dialect;
pub use pool::Database;

use chat::SqlChatSessionStore;
use event::SqlEventStore;
use lead::SqlLeadStore;
use session::SqlSessionStore;
use user::SqlUserStore;
use widget::SqlWidgetConfigStore;

/// A parameter value for a neutral statement template. Owned, cloneable,
/// and bound positionally in template order.
#[derive(Debug, Clone)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Null,
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(v: Option<String>) -> Self {
        match v {
            Some(s) => SqlValue::Text(s),
            None => SqlValue::Null,
        }
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(v: Option<i64>) -> Self {
        match v {
            Some(n) => SqlValue::Int(n),
            None => SqlValue::Null,
        }
    }
}

/// Bind parameter values onto a query in template order.
pub(crate) fn bind_values<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>,
    values: &'q [SqlValue],
) -> sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

/// Map a driver error onto the store taxonomy.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
        sqlx::Error::PoolClosed => StoreError::Connect("connection pool is closed".to_string()),
        sqlx::Error::Configuration(e) => StoreError::Configuration(e.to_string()),
        sqlx::Error::Io(e) => StoreError::Connect(e.to_string()),
        sqlx::Error::Tls(e) => StoreError::Connect(e.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// The full store set over one [`Database`].
#[derive(Clone)]
pub struct SqlBackend {
    leads: SqlLeadStore,
    chats: SqlChatSessionStore,
    events: SqlEventStore,
    users: SqlUserStore,
    sessions: SqlSessionStore,
    widgets: SqlWidgetConfigStore,
}

impl SqlBackend {
    pub fn new(db: Database) -> Self {
        Self {
            leads: SqlLeadStore::new(db.clone()),
            chats: SqlChatSessionStore::new(db.clone()),
            events: SqlEventStore::new(db.clone()),
            users: SqlUserStore::new(db.clone()),
            sessions: SqlSessionStore::new(db.clone()),
            widgets: SqlWidgetConfigStore::new(db),
        }
    }
}


impl Backend for SqlBackend {
    type Leads = SqlLeadStore;
    type Chats = SqlChatSessionStore;
    type Events = SqlEventStore;
    type Users = SqlUserStore;
    type Sessions = SqlSessionStore;
    type Widgets = SqlWidgetConfigStore;

    fn leads(&self) -> &Self::Leads {
        &self.leads
    }

    fn chats(&self) -> &Self::Chats {
        &self.chats
    }

    fn events(&self) -> &Self::Events {
        &self.events
    }

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn sessions(&self) -> &Self::Sessions {
        &self.sessions
    }

    fn widgets(&self) -> &Self::Widgets {
        &self.widgets
    }
}

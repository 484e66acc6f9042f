//! File-backed storage.
//!
//! Development fallback used when no database descriptor is configured:
//! one JSON document per collection under the data directory, guarded by
//! a single `RwLock` and rewritten atomically on every mutation. Matches
//! the SQL backend's observable semantics, including referential
//! behavior the schemas enforce there (dangling `lead_id` rejected on
//! write, nulled out when the lead goes away, sessions removed with
//! their user).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use leadbay_core::json;
use leadbay_core::page::{Page, PageRequest, DEFAULT_EVENT_LIMIT, DEFAULT_LIST_LIMIT};
use leadbay_core::store::chat::{ChatSessionFilter, ChatSessionStore};
use leadbay_core::store::event::{EventFilter, EventStore};
use leadbay_core::store::lead::{LeadFilter, LeadStore};
use leadbay_core::store::session::SessionStore;
use leadbay_core::store::user::{UserFilter, UserStore};
use leadbay_core::store::widget::WidgetConfigStore;
use leadbay_core::store::Backend;
use leadbay_types::chat::{ChatSession, CreateChatSession, UpdateChatSession};
use leadbay_types::error::StoreError;
use leadbay_types::event::{CreateEvent, Event};
use leadbay_types::lead::{CreateLead, Lead, UpdateLead};
use leadbay_types::time::now;
use leadbay_types::user::{CreateUser, Session, UpdateUser, User, DEFAULT_ROLE};
use leadbay_types::widget::{
    UpsertWidgetConfig, WidgetConfig, DEFAULT_POSITION, DEFAULT_PRIMARY_COLOR,
    DEFAULT_WELCOME_MESSAGE, DEFAULT_WIDGET_TITLE,
};

use crate::password::{hash_password, verify_password};

/// A user row as persisted: the domain entity plus the hash that never
/// leaves this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    user: User,
    password_hash: String,
}

/// One collection document: a monotonic id counter and the rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Collection<T> {
    next_id: i64,
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            items: Vec::new(),
        }
    }
}

impl<T> Collection<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Debug, Default)]
struct FileState {
    leads: Collection<Lead>,
    chats: Collection<ChatSession>,
    events: Collection<Event>,
    users: Collection<UserRecord>,
    sessions: Collection<Session>,
    widgets: Collection<WidgetConfig>,
}

#[derive(Clone)]
pub struct FileBackend {
    dir: PathBuf,
    state: Arc<RwLock<FileState>>,
}

const LEADS_FILE: &str = "leads.json";
const CHATS_FILE: &str = "chat_sessions.json";
const EVENTS_FILE: &str = "events.json";
const USERS_FILE: &str = "users.json";
const SESSIONS_FILE: &str = "sessions.json";
const WIDGETS_FILE: &str = "widget_configs.json";

impl FileBackend {
    /// Open the data directory, creating it and loading any existing
    /// collection documents.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Configuration(format!("cannot create {}: {e}", dir.display())))?;

        let state = FileState {
            leads: load_collection(&dir, LEADS_FILE).await?,
            chats: load_collection(&dir, CHATS_FILE).await?,
            events: load_collection(&dir, EVENTS_FILE).await?,
            users: load_collection(&dir, USERS_FILE).await?,
            sessions: load_collection(&dir, SESSIONS_FILE).await?,
            widgets: load_collection(&dir, WIDGETS_FILE).await?,
        };

        tracing::info!(dir = %dir.display(), "file storage opened");
        Ok(Self {
            dir,
            state: Arc::new(RwLock::new(state)),
        })
    }

    async fn persist<T: Serialize>(
        &self,
        file: &str,
        collection: &Collection<T>,
    ) -> Result<(), StoreError> {
        write_collection(&self.dir, file, collection).await
    }
}

async fn load_collection<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
) -> Result<Collection<T>, StoreError> {
    let path = dir.join(file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Schema(format!("corrupt document {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Collection::default()),
        Err(e) => Err(StoreError::Connect(format!(
            "cannot read {}: {e}",
            path.display()
        ))),
    }
}

/// Write via a sibling temp file and rename, so a crash mid-write never
/// truncates the live document.
async fn write_collection<T: Serialize>(
    dir: &Path,
    file: &str,
    collection: &Collection<T>,
) -> Result<(), StoreError> {
    let path = dir.join(file);
    let tmp = dir.join(format!("{file}.tmp"));
    let bytes = serde_json::to_vec_pretty(collection)
        .map_err(|e| StoreError::Query(format!("cannot serialize {file}: {e}")))?;
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| StoreError::Connect(format!("cannot write {}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|e| StoreError::Connect(format!("cannot replace {}: {e}", path.display())))?;
    Ok(())
}

fn sort_newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn paginate<T>(items: Vec<T>, page: &PageRequest, default_limit: i64) -> Vec<T> {
    let (limit, offset) = page.resolve(default_limit);
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

fn matches_search(term: &str, fields: &[Option<&str>]) -> bool {
    let term = term.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|f| f.to_lowercase().contains(&term))
}

fn in_date_range(
    at: &DateTime<Utc>,
    start: Option<&DateTime<Utc>>,
    end: Option<&DateTime<Utc>>,
) -> bool {
    start.is_none_or(|s| at >= s) && end.is_none_or(|e| at <= e)
}

impl LeadStore for FileBackend {
    async fn create(&self, input: CreateLead) -> Result<Lead, StoreError> {
        let mut state = self.state.write().await;
        let created_at = now();
        let lead = Lead {
            id: state.leads.allocate_id(),
            phone: input.phone,
            bhk_type: input.bhk_type,
            bhk: input.bhk,
            microsite: input.microsite,
            lead_source: input
                .lead_source
                .unwrap_or_else(|| "ChatWidget".to_string()),
            status: input.status.unwrap_or_default(),
            metadata: json::normalize(
                input.metadata.unwrap_or(serde_json::Value::Null),
                &json::empty_object(),
            ),
            conversation: json::normalize(
                input.conversation.unwrap_or(serde_json::Value::Null),
                &json::empty_array(),
            ),
            location: input.location,
            created_at,
            updated_at: created_at,
        };
        state.leads.items.push(lead.clone());
        self.persist(LEADS_FILE, &state.leads).await?;
        Ok(lead)
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Page<Lead>, StoreError> {
        let state = self.state.read().await;
        let mut matched: Vec<Lead> = state
            .leads
            .items
            .iter()
            .filter(|lead| {
                filter
                    .microsite
                    .as_ref()
                    .is_none_or(|m| &lead.microsite == m)
                    && filter.status.is_none_or(|s| lead.status == s)
                    && filter.phone.as_ref().is_none_or(|p| {
                        lead.phone.as_deref() == Some(p.as_str())
                    })
                    && filter.search.as_ref().is_none_or(|term| {
                        let metadata = lead.metadata.to_string();
                        matches_search(
                            term,
                            &[
                                Some(lead.microsite.as_str()),
                                lead.phone.as_deref(),
                                Some(metadata.as_str()),
                            ],
                        )
                    })
                    && in_date_range(
                        &lead.created_at,
                        filter.start_date.as_ref(),
                        filter.end_date.as_ref(),
                    )
            })
            .cloned()
            .collect();

        let total = matched.len() as i64;
        sort_newest_first(&mut matched, |l| (l.created_at, l.id));
        Ok(Page {
            items: paginate(matched, &filter.page, DEFAULT_LIST_LIMIT),
            total,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>, StoreError> {
        let state = self.state.read().await;
        Ok(state.leads.items.iter().find(|l| l.id == id).cloned())
    }

    async fn update(&self, id: i64, patch: UpdateLead) -> Result<Option<Lead>, StoreError> {
        let mut state = self.state.write().await;
        let Some(lead) = state.leads.items.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(lead.clone()));
        }

        if let Some(phone) = patch.phone {
            lead.phone = Some(phone);
        }
        if let Some(bhk_type) = patch.bhk_type {
            lead.bhk_type = bhk_type;
        }
        if let Some(bhk) = patch.bhk {
            lead.bhk = Some(bhk);
        }
        if let Some(lead_source) = patch.lead_source {
            lead.lead_source = lead_source;
        }
        if let Some(status) = patch.status {
            lead.status = status;
        }
        if let Some(metadata) = patch.metadata {
            lead.metadata = json::normalize(metadata, &json::empty_object());
        }
        if let Some(conversation) = patch.conversation {
            lead.conversation = json::normalize(conversation, &json::empty_array());
        }
        if let Some(location) = patch.location {
            lead.location = Some(location);
        }
        lead.updated_at = now();

        let updated = lead.clone();
        self.persist(LEADS_FILE, &state.leads).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.leads.items.len();
        state.leads.items.retain(|l| l.id != id);
        if state.leads.items.len() == before {
            return Ok(());
        }

        // Detach transcripts the way the schemas do with ON DELETE SET
        // NULL.
        let mut chats_touched = false;
        for chat in &mut state.chats.items {
            if chat.lead_id == Some(id) {
                chat.lead_id = None;
                chats_touched = true;
            }
        }

        self.persist(LEADS_FILE, &state.leads).await?;
        if chats_touched {
            self.persist(CHATS_FILE, &state.chats).await?;
        }
        Ok(())
    }
}

impl ChatSessionStore for FileBackend {
    async fn create(&self, input: CreateChatSession) -> Result<ChatSession, StoreError> {
        let mut state = self.state.write().await;
        if let Some(lead_id) = input.lead_id {
            if !state.leads.items.iter().any(|l| l.id == lead_id) {
                return Err(StoreError::Query(format!(
                    "lead {lead_id} does not exist"
                )));
            }
        }

        let created_at = now();
        let chat = ChatSession {
            id: state.chats.allocate_id(),
            microsite: input.microsite,
            project_id: input.project_id,
            lead_id: input.lead_id,
            phone: input.phone,
            bhk_type: input.bhk_type,
            conversation: json::normalize(
                input.conversation.unwrap_or(serde_json::Value::Null),
                &json::empty_array(),
            ),
            metadata: json::normalize(
                input.metadata.unwrap_or(serde_json::Value::Null),
                &json::empty_object(),
            ),
            location: input.location,
            created_at,
            updated_at: created_at,
        };
        state.chats.items.push(chat.clone());
        self.persist(CHATS_FILE, &state.chats).await?;
        Ok(chat)
    }

    async fn list(&self, filter: &ChatSessionFilter) -> Result<Page<ChatSession>, StoreError> {
        let state = self.state.read().await;
        let mut matched: Vec<ChatSession> = state
            .chats
            .items
            .iter()
            .filter(|chat| {
                filter
                    .microsite
                    .as_ref()
                    .is_none_or(|m| &chat.microsite == m)
                    && filter
                        .project_id
                        .as_ref()
                        .is_none_or(|p| chat.project_id.as_deref() == Some(p.as_str()))
                    && filter.lead_id.is_none_or(|id| chat.lead_id == Some(id))
                    && filter.search.as_ref().is_none_or(|term| {
                        let metadata = chat.metadata.to_string();
                        matches_search(
                            term,
                            &[
                                Some(chat.microsite.as_str()),
                                chat.phone.as_deref(),
                                Some(metadata.as_str()),
                            ],
                        )
                    })
                    && in_date_range(
                        &chat.created_at,
                        filter.start_date.as_ref(),
                        filter.end_date.as_ref(),
                    )
            })
            .cloned()
            .collect();

        let total = matched.len() as i64;
        sort_newest_first(&mut matched, |c| (c.created_at, c.id));
        Ok(Page {
            items: paginate(matched, &filter.page, DEFAULT_LIST_LIMIT),
            total,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ChatSession>, StoreError> {
        let state = self.state.read().await;
        Ok(state.chats.items.iter().find(|c| c.id == id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        patch: UpdateChatSession,
    ) -> Result<Option<ChatSession>, StoreError> {
        let mut state = self.state.write().await;
        // Missing row wins over a bad lead reference, matching how an
        // UPDATE that affects zero rows never evaluates the foreign key.
        if !state.chats.items.iter().any(|c| c.id == id) {
            return Ok(None);
        }
        if let Some(lead_id) = patch.lead_id {
            if !state.leads.items.iter().any(|l| l.id == lead_id) {
                return Err(StoreError::Query(format!(
                    "lead {lead_id} does not exist"
                )));
            }
        }
        let Some(chat) = state.chats.items.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(chat.clone()));
        }

        if let Some(project_id) = patch.project_id {
            chat.project_id = Some(project_id);
        }
        if let Some(lead_id) = patch.lead_id {
            chat.lead_id = Some(lead_id);
        }
        if let Some(phone) = patch.phone {
            chat.phone = Some(phone);
        }
        if let Some(bhk_type) = patch.bhk_type {
            chat.bhk_type = Some(bhk_type);
        }
        if let Some(conversation) = patch.conversation {
            chat.conversation = json::normalize(conversation, &json::empty_array());
        }
        if let Some(metadata) = patch.metadata {
            chat.metadata = json::normalize(metadata, &json::empty_object());
        }
        if let Some(location) = patch.location {
            chat.location = Some(location);
        }
        chat.updated_at = now();

        let updated = chat.clone();
        self.persist(CHATS_FILE, &state.chats).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.chats.items.len();
        state.chats.items.retain(|c| c.id != id);
        if state.chats.items.len() != before {
            self.persist(CHATS_FILE, &state.chats).await?;
        }
        Ok(())
    }
}

impl EventStore for FileBackend {
    async fn create(&self, input: CreateEvent) -> Result<Event, StoreError> {
        let mut state = self.state.write().await;
        let event = Event {
            id: state.events.allocate_id(),
            event_type: input.event_type,
            project_id: input.project_id,
            microsite: input.microsite,
            payload: json::normalize(
                input.payload.unwrap_or(serde_json::Value::Null),
                &json::empty_object(),
            ),
            location: input.location,
            created_at: now(),
        };
        state.events.items.push(event.clone());
        self.persist(EVENTS_FILE, &state.events).await?;
        Ok(event)
    }

    async fn list(&self, filter: &EventFilter) -> Result<Page<Event>, StoreError> {
        let state = self.state.read().await;
        let mut matched: Vec<Event> = state
            .events
            .items
            .iter()
            .filter(|event| {
                filter
                    .event_type
                    .as_ref()
                    .is_none_or(|t| &event.event_type == t)
                    && filter
                        .project_id
                        .as_ref()
                        .is_none_or(|p| &event.project_id == p)
                    && filter
                        .microsite
                        .as_ref()
                        .is_none_or(|m| event.microsite.as_deref() == Some(m.as_str()))
                    && in_date_range(
                        &event.created_at,
                        filter.start_date.as_ref(),
                        filter.end_date.as_ref(),
                    )
            })
            .cloned()
            .collect();

        let total = matched.len() as i64;
        sort_newest_first(&mut matched, |e| (e.created_at, e.id));
        Ok(Page {
            items: paginate(matched, &filter.page, DEFAULT_EVENT_LIMIT),
            total,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>, StoreError> {
        let state = self.state.read().await;
        Ok(state.events.items.iter().find(|e| e.id == id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.events.items.len();
        state.events.items.retain(|e| e.id != id);
        if state.events.items.len() != before {
            self.persist(EVENTS_FILE, &state.events).await?;
        }
        Ok(())
    }
}

impl UserStore for FileBackend {
    async fn create(&self, input: CreateUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state
            .users
            .items
            .iter()
            .any(|r| r.user.username == input.username)
        {
            return Err(StoreError::Query(format!(
                "username {} already exists",
                input.username
            )));
        }

        let created_at = now();
        let user = User {
            id: state.users.allocate_id(),
            username: input.username,
            email: input.email,
            role: input.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            created_at,
            updated_at: created_at,
        };
        state.users.items.push(UserRecord {
            user: user.clone(),
            password_hash: hash_password(&input.password)?,
        });
        self.persist(USERS_FILE, &state.users).await?;
        Ok(user)
    }

    async fn list(&self, filter: &UserFilter) -> Result<Page<User>, StoreError> {
        let state = self.state.read().await;
        let mut matched: Vec<User> = state
            .users
            .items
            .iter()
            .filter(|record| {
                filter.role.as_ref().is_none_or(|r| &record.user.role == r)
                    && filter.search.as_ref().is_none_or(|term| {
                        matches_search(
                            term,
                            &[
                                Some(record.user.username.as_str()),
                                record.user.email.as_deref(),
                            ],
                        )
                    })
            })
            .map(|r| r.user.clone())
            .collect();

        let total = matched.len() as i64;
        sort_newest_first(&mut matched, |u| (u.created_at, u.id));
        Ok(Page {
            items: paginate(matched, &filter.page, DEFAULT_LIST_LIMIT),
            total,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .items
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .items
            .iter()
            .find(|r| r.user.username == username)
            .map(|r| r.user.clone()))
    }

    async fn update(&self, id: i64, patch: UpdateUser) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        let Some(record) = state.users.items.iter_mut().find(|r| r.user.id == id) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(record.user.clone()));
        }

        if let Some(email) = patch.email {
            record.user.email = Some(email);
        }
        if let Some(role) = patch.role {
            record.user.role = role;
        }
        if let Some(password) = patch.password {
            record.password_hash = hash_password(&password)?;
        }
        record.user.updated_at = now();

        let updated = record.user.clone();
        self.persist(USERS_FILE, &state.users).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.users.items.len();
        state.users.items.retain(|r| r.user.id != id);
        if state.users.items.len() == before {
            return Ok(());
        }

        // Sessions go with their user, as the schemas cascade.
        let sessions_before = state.sessions.items.len();
        state.sessions.items.retain(|s| s.user_id != id);

        self.persist(USERS_FILE, &state.users).await?;
        if state.sessions.items.len() != sessions_before {
            self.persist(SESSIONS_FILE, &state.sessions).await?;
        }
        Ok(())
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        let Some(record) = state
            .users
            .items
            .iter()
            .find(|r| r.user.username == username)
        else {
            return Ok(None);
        };
        if verify_password(password, &record.password_hash) {
            Ok(Some(record.user.clone()))
        } else {
            Ok(None)
        }
    }
}

impl SessionStore for FileBackend {
    async fn create(&self, user_id: i64, ttl_secs: i64) -> Result<Session, StoreError> {
        let mut state = self.state.write().await;
        let created_at = now();
        let session = Session {
            id: state.sessions.allocate_id(),
            user_id,
            token: Uuid::now_v7().to_string(),
            expires_at: created_at + Duration::seconds(ttl_secs),
            created_at,
        };
        state.sessions.items.push(session.clone());
        self.persist(SESSIONS_FILE, &state.sessions).await?;
        Ok(session)
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .items
            .iter()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.sessions.items.len();
        state.sessions.items.retain(|s| s.token != token);
        if state.sessions.items.len() != before {
            self.persist(SESSIONS_FILE, &state.sessions).await?;
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let cutoff = now();
        let before = state.sessions.items.len();
        state.sessions.items.retain(|s| s.expires_at > cutoff);
        let removed = (before - state.sessions.items.len()) as u64;
        if removed > 0 {
            self.persist(SESSIONS_FILE, &state.sessions).await?;
        }
        Ok(removed)
    }
}

impl WidgetConfigStore for FileBackend {
    async fn get_by_project(&self, project_id: &str) -> Result<Option<WidgetConfig>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .widgets
            .items
            .iter()
            .find(|w| w.project_id == project_id)
            .cloned())
    }

    async fn upsert(
        &self,
        project_id: &str,
        input: UpsertWidgetConfig,
    ) -> Result<WidgetConfig, StoreError> {
        let mut state = self.state.write().await;

        if let Some(config) = state
            .widgets
            .items
            .iter_mut()
            .find(|w| w.project_id == project_id)
        {
            let mut touched = false;
            if let Some(widget_title) = input.widget_title {
                config.widget_title = widget_title;
                touched = true;
            }
            if let Some(welcome_message) = input.welcome_message {
                config.welcome_message = welcome_message;
                touched = true;
            }
            if let Some(primary_color) = input.primary_color {
                config.primary_color = primary_color;
                touched = true;
            }
            if let Some(position) = input.position {
                config.position = position;
                touched = true;
            }
            if let Some(enabled) = input.enabled {
                config.enabled = enabled;
                touched = true;
            }
            if let Some(property_info) = input.property_info {
                config.property_info = json::normalize(property_info, &json::empty_object());
                touched = true;
            }
            if !touched {
                return Ok(config.clone());
            }
            config.updated_at = now();
            let updated = config.clone();
            self.persist(WIDGETS_FILE, &state.widgets).await?;
            return Ok(updated);
        }

        let created_at = now();
        let config = WidgetConfig {
            id: state.widgets.allocate_id(),
            project_id: project_id.to_string(),
            widget_title: input
                .widget_title
                .unwrap_or_else(|| DEFAULT_WIDGET_TITLE.to_string()),
            welcome_message: input
                .welcome_message
                .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string()),
            primary_color: input
                .primary_color
                .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            position: input
                .position
                .unwrap_or_else(|| DEFAULT_POSITION.to_string()),
            enabled: input.enabled.unwrap_or(true),
            property_info: json::normalize(
                input.property_info.unwrap_or(serde_json::Value::Null),
                &json::empty_object(),
            ),
            created_at,
            updated_at: created_at,
        };
        state.widgets.items.push(config.clone());
        self.persist(WIDGETS_FILE, &state.widgets).await?;
        Ok(config)
    }
}

impl Backend for FileBackend {
    type Leads = Self;
    type Chats = Self;
    type Events = Self;
    type Users = Self;
    type Sessions = Self;
    type Widgets = Self;

    fn leads(&self) -> &Self::Leads {
        self
    }

    fn chats(&self) -> &Self::Chats {
        self
    }

    fn events(&self) -> &Self::Events {
        self
    }

    fn users(&self) -> &Self::Users {
        self
    }

    fn sessions(&self) -> &Self::Sessions {
        self
    }

    fn widgets(&self) -> &Self::Widgets {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn test_backend() -> FileBackend {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        std::mem::forget(dir);
        FileBackend::open(path).await.unwrap()
    }

    fn make_lead(microsite: &str) -> CreateLead {
        CreateLead {
            phone: None,
            bhk_type: "2BHK".to_string(),
            bhk: None,
            microsite: microsite.to_string(),
            lead_source: None,
            status: None,
            metadata: None,
            conversation: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_lead_create_applies_defaults() {
        let backend = test_backend().await;

        let lead = LeadStore::create(&backend, make_lead("site-a")).await.unwrap();
        assert_eq!(lead.id, 1);
        assert_eq!(lead.lead_source, "ChatWidget");
        assert_eq!(lead.metadata, json!({}));
        assert_eq!(lead.conversation, json!([]));
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        std::mem::forget(dir);

        let backend = FileBackend::open(path.clone()).await.unwrap();
        let lead = LeadStore::create(&backend, make_lead("site-a")).await.unwrap();
        drop(backend);

        let reopened = FileBackend::open(path).await.unwrap();
        let found = LeadStore::get_by_id(&reopened, lead.id).await.unwrap().unwrap();
        assert_eq!(found.microsite, "site-a");

        // Id allocation continues past persisted rows.
        let next = LeadStore::create(&reopened, make_lead("site-b")).await.unwrap();
        assert!(next.id > lead.id);
    }

    #[tokio::test]
    async fn test_lead_list_filter_and_total() {
        let backend = test_backend().await;
        for _ in 0..3 {
            LeadStore::create(&backend, make_lead("site-a")).await.unwrap();
        }
        LeadStore::create(&backend, make_lead("site-b")).await.unwrap();

        let filter = LeadFilter {
            microsite: Some("site-a".to_string()),
            page: PageRequest {
                limit: Some(2),
                skip: Some(0),
            },
            ..Default::default()
        };
        let page = LeadStore::list(&backend, &filter).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_chat_rejects_dangling_lead() {
        let backend = test_backend().await;
        let input = CreateChatSession {
            microsite: "site-a".to_string(),
            project_id: None,
            lead_id: Some(42),
            phone: None,
            bhk_type: None,
            conversation: None,
            metadata: None,
            location: None,
        };
        let err = ChatSessionStore::create(&backend, input).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_chat_update_absent_row_ignores_bad_lead() {
        let backend = test_backend().await;
        let patch = UpdateChatSession {
            lead_id: Some(42),
            ..Default::default()
        };
        let result = ChatSessionStore::update(&backend, 99_999, patch)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_lead_delete_detaches_chats() {
        let backend = test_backend().await;
        let lead = LeadStore::create(&backend, make_lead("site-a")).await.unwrap();
        let chat = ChatSessionStore::create(
            &backend,
            CreateChatSession {
                microsite: "site-a".to_string(),
                project_id: None,
                lead_id: Some(lead.id),
                phone: None,
                bhk_type: None,
                conversation: Some(json!([{"role": "user", "text": "hi"}])),
                metadata: None,
                location: None,
            },
        )
        .await
        .unwrap();

        LeadStore::delete(&backend, lead.id).await.unwrap();

        let after = ChatSessionStore::get_by_id(&backend, chat.id)
            .await
            .unwrap()
            .unwrap();
        assert!(after.lead_id.is_none());
        assert_eq!(after.conversation, chat.conversation);
    }

    #[tokio::test]
    async fn test_user_delete_removes_sessions() {
        let backend = test_backend().await;
        let user = UserStore::create(
            &backend,
            CreateUser {
                username: "ops".to_string(),
                password: "hunter2!".to_string(),
                email: None,
                role: None,
            },
        )
        .await
        .unwrap();
        let session = SessionStore::create(&backend, user.id, 3600).await.unwrap();

        UserStore::delete(&backend, user.id).await.unwrap();
        assert!(SessionStore::get_by_token(&backend, &session.token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let backend = test_backend().await;
        let input = CreateUser {
            username: "ops".to_string(),
            password: "hunter2!".to_string(),
            email: None,
            role: None,
        };
        UserStore::create(&backend, input.clone()).await.unwrap();
        let err = UserStore::create(&backend, input).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let backend = test_backend().await;
        UserStore::create(
            &backend,
            CreateUser {
                username: "ops".to_string(),
                password: "hunter2!".to_string(),
                email: None,
                role: None,
            },
        )
        .await
        .unwrap();

        assert!(backend
            .verify_credentials("ops", "hunter2!")
            .await
            .unwrap()
            .is_some());
        assert!(backend
            .verify_credentials("ops", "wrong")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_sessions() {
        let backend = test_backend().await;
        let user = UserStore::create(
            &backend,
            CreateUser {
                username: "ops".to_string(),
                password: "hunter2!".to_string(),
                email: None,
                role: None,
            },
        )
        .await
        .unwrap();

        let live = SessionStore::create(&backend, user.id, 3600).await.unwrap();
        SessionStore::create(&backend, user.id, -60).await.unwrap();

        let removed = backend.delete_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(SessionStore::get_by_token(&backend, &live.token)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_widget_upsert_create_then_patch() {
        let backend = test_backend().await;

        let created = backend
            .upsert("proj-1", UpsertWidgetConfig::default())
            .await
            .unwrap();
        assert_eq!(created.widget_title, DEFAULT_WIDGET_TITLE);
        assert!(created.enabled);

        let patched = backend
            .upsert(
                "proj-1",
                UpsertWidgetConfig {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.id, created.id);
        assert!(!patched.enabled);
    }

    #[tokio::test]
    async fn test_event_payload_defaults() {
        let backend = test_backend().await;
        let event = EventStore::create(
            &backend,
            CreateEvent {
                event_type: "widget_open".to_string(),
                project_id: "proj-1".to_string(),
                microsite: None,
                payload: None,
                location: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(event.payload, json!({}));
    }
}

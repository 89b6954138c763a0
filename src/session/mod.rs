//! Per-caller session flags and the flash message queue
//!
//! Session state is keyed string-to-string and scoped to a single caller,
//! so no locking discipline is required above the store itself. Flash
//! messages are queued on the session and consumed exactly once on the
//! next render.

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

/// Severity of a flash message shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Info,
    Error,
    Warning,
    Success,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Info => "info",
            FlashKind::Error => "error",
            FlashKind::Warning => "warning",
            FlashKind::Success => "success",
        }
    }
}

/// A queued, already-translated flash message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    #[serde(rename = "type")]
    pub kind: FlashKind,
    pub message: String,
}

/// Keyed per-caller persisted state plus the flash queue
pub trait SessionStore: Send + Sync {
    /// Allocate a new session and return its id
    fn create(&self) -> String;

    fn get(&self, sid: &str, key: &str) -> Option<String>;

    fn set(&self, sid: &str, key: &str, value: &str);

    fn add_flash(&self, sid: &str, kind: FlashKind, message: String);

    /// Drain the flash queue; entries are consumed exactly once
    fn take_flashes(&self, sid: &str) -> Vec<Flash>;

    fn flash_count(&self, sid: &str) -> usize;

    /// Drop a session and all of its state
    fn remove(&self, sid: &str);
}

/// A session store bound to one caller's session id.
///
/// Threaded through operations explicitly instead of living in ambient
/// process-wide state.
#[derive(Clone)]
pub struct SessionHandle {
    store: Arc<dyn SessionStore>,
    id: String,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn SessionStore>, id: String) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(&self.id, key)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.store
            .get(&self.id, key)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.store.set(&self.id, key, value);
    }

    pub fn add_flash(&self, kind: FlashKind, message: String) {
        self.store.add_flash(&self.id, kind, message);
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        self.store.take_flashes(&self.id)
    }

    pub fn flash_count(&self) -> usize {
        self.store.flash_count(&self.id)
    }
}

#[derive(Default)]
struct SessionData {
    values: HashMap<String, String>,
    flashes: Vec<Flash>,
}

/// In-memory session store keyed by session id.
///
/// Entries live until removed. Hosts serving untrusted callers should evict
/// idle sessions through [`SessionStore::remove`] or plug in a store with
/// built-in expiry, since every cookieless request allocates a fresh entry.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self) -> String {
        let sid = Uuid::new_v4().to_string();
        self.sessions.insert(sid.clone(), SessionData::default());
        sid
    }

    fn get(&self, sid: &str, key: &str) -> Option<String> {
        self.sessions
            .get(sid)
            .and_then(|entry| entry.values.get(key).cloned())
    }

    fn set(&self, sid: &str, key: &str, value: &str) {
        self.sessions
            .entry(sid.to_string())
            .or_default()
            .values
            .insert(key.to_string(), value.to_string());
    }

    fn add_flash(&self, sid: &str, kind: FlashKind, message: String) {
        self.sessions
            .entry(sid.to_string())
            .or_default()
            .flashes
            .push(Flash { kind, message });
    }

    fn take_flashes(&self, sid: &str) -> Vec<Flash> {
        self.sessions
            .get_mut(sid)
            .map(|mut entry| std::mem::take(&mut entry.flashes))
            .unwrap_or_default()
    }

    fn flash_count(&self, sid: &str) -> usize {
        self.sessions
            .get(sid)
            .map(|entry| entry.flashes.len())
            .unwrap_or(0)
    }

    fn remove(&self, sid: &str) {
        self.sessions.remove(sid);
    }
}

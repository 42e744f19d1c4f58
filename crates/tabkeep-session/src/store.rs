//! Session Store
//!
//! Owns the persisted session collection and the active-session pointer.
//!
//! Every mutation reads the whole collection, changes it in memory and writes
//! the whole collection back under one key. The host store offers no
//! transaction across that read and write, so two mutations racing each other
//! can lose one update. Operations are user-triggered and rare, and this
//! store does not pretend otherwise.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use tabkeep_storage::{KeyValueStore, StorageError};
use tabkeep_tabs::{TabControl, TabRecord};

use crate::error::SessionError;
use crate::reconciler::{self, SessionStatus};
use crate::session::{Session, SessionCollection};
use crate::Result;

/// Store key of the session collection
pub const SESSIONS_KEY: &str = "sessions";
/// Store key of the active-session pointer
pub const ACTIVE_SESSION_KEY: &str = "activeSessionId";

/// Everything persisted, as returned by [`SessionStore::get_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    pub sessions: SessionCollection,
    pub active_session_id: Option<String>,
}

/// A session with its relation to the live window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session: Session,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreOutcome {
    /// Stored tabs left out because their URL is not safe to reopen
    pub skipped: usize,
    /// Tabs the host refused to open when adding to the window
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub imported: usize,
    /// Records left out: id already present or malformed
    pub skipped: usize,
}

pub struct SessionStore {
    /// Host key-value store
    store: Arc<dyn KeyValueStore>,
    /// Host tab surface for the current window
    tabs: Arc<dyn TabControl>,
}

impl SessionStore {
    pub fn new<S, T>(store: S, tabs: T) -> Self
    where
        S: KeyValueStore + 'static,
        T: TabControl + 'static,
    {
        Self {
            store: Arc::new(store),
            tabs: Arc::new(tabs),
        }
    }

    async fn load_sessions(&self) -> Result<SessionCollection> {
        match self.store.get(SESSIONS_KEY).await? {
            None | Some(Value::Null) => Ok(SessionCollection::new()),
            Some(value) => Ok(serde_json::from_value(value).map_err(StorageError::from)?),
        }
    }

    async fn save_sessions(&self, sessions: &SessionCollection) -> Result<()> {
        let value = serde_json::to_value(sessions).map_err(StorageError::from)?;
        self.store.set(SESSIONS_KEY, value).await?;
        Ok(())
    }

    async fn active_session_id(&self) -> Result<Option<String>> {
        Ok(match self.store.get(ACTIVE_SESSION_KEY).await? {
            Some(Value::String(id)) => Some(id),
            _ => None,
        })
    }

    async fn set_active_session_id(&self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => {
                self.store
                    .set(ACTIVE_SESSION_KEY, Value::String(id.to_string()))
                    .await?
            }
            None => self.store.remove(ACTIVE_SESSION_KEY).await?,
        }
        Ok(())
    }

    /// Capture the live window, keeping only tabs safe to store
    async fn capture_tabs(&self) -> Result<Vec<TabRecord>> {
        let live = self.tabs.list_tabs().await?;
        let tabs = reconciler::capture(&live);
        if tabs.is_empty() {
            return Err(SessionError::NoSaveableTabs);
        }
        Ok(tabs)
    }

    /// Get all sessions and the active-session pointer. Never writes.
    pub async fn get_all(&self) -> Result<StoredState> {
        Ok(StoredState {
            sessions: self.load_sessions().await?,
            active_session_id: self.active_session_id().await?,
        })
    }

    /// Get one session by id
    pub async fn get(&self, session_id: &str) -> Result<Session> {
        self.load_sessions()
            .await?
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// All sessions, newest first
    pub async fn list(&self) -> Result<Vec<Session>> {
        let mut sessions: Vec<Session> = self.load_sessions().await?.into_values().collect();
        sessions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(sessions)
    }

    /// Every session, newest first, classified against the live window.
    ///
    /// The live tabs go through the same safe filter as a capture before
    /// comparing. Internal pages can never be part of a saved session, so an
    /// open new-tab or settings page must not count as an unsaved change.
    pub async fn overview(&self) -> Result<Vec<SessionEntry>> {
        let sessions = self.list().await?;
        let active_id = self.active_session_id().await?;

        let live = reconciler::capture(&self.tabs.list_tabs().await?);
        let live_urls: HashSet<&str> = live.iter().map(|t| t.url.as_str()).collect();

        Ok(sessions
            .into_iter()
            .map(|session| {
                let is_active = active_id.as_deref() == Some(session.id.as_str());
                let status = reconciler::classify(session.urls(), &live_urls, is_active);
                SessionEntry { session, status }
            })
            .collect())
    }

    /// Whether the window has drifted from the active session
    pub async fn has_unsaved_changes(&self) -> Result<bool> {
        Ok(self
            .overview()
            .await?
            .iter()
            .any(|entry| entry.status.has_unsaved_changes()))
    }

    /// Save the current window as a new session
    pub async fn create(&self, name: &str) -> Result<Session> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::Validation(
                "Session name cannot be empty".to_string(),
            ));
        }

        let tabs = self.capture_tabs().await?;
        let session = Session::new(name.to_string(), tabs);

        let mut sessions = self.load_sessions().await?;
        sessions.insert(session.id.clone(), session.clone());
        self.save_sessions(&sessions).await?;

        tracing::info!(
            session_id = %session.id,
            session_name = %session.name,
            tab_count = session.tab_count(),
            "Created session"
        );

        Ok(session)
    }

    /// Replace a session's tabs with the current window
    pub async fn update(&self, session_id: &str) -> Result<Session> {
        let mut sessions = self.load_sessions().await?;
        if !sessions.contains_key(session_id) {
            return Err(SessionError::NotFound(session_id.to_string()));
        }

        let tabs = self.capture_tabs().await?;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        session.replace_tabs(tabs);
        let session = session.clone();

        self.save_sessions(&sessions).await?;

        tracing::info!(
            session_id = %session.id,
            tab_count = session.tab_count(),
            "Updated session"
        );

        Ok(session)
    }

    pub async fn rename(&self, session_id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::Validation(
                "Session name cannot be empty".to_string(),
            ));
        }

        let mut sessions = self.load_sessions().await?;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        session.rename(name.to_string());

        self.save_sessions(&sessions).await?;

        tracing::info!(session_id = %session_id, session_name = %name, "Renamed session");

        Ok(())
    }

    /// Delete a session, clearing the active pointer if it pointed here
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.load_sessions().await?;
        if sessions.remove(session_id).is_none() {
            return Err(SessionError::NotFound(session_id.to_string()));
        }

        // Pointer first: a failed collection write must not leave it dangling
        if self.active_session_id().await?.as_deref() == Some(session_id) {
            self.set_active_session_id(None).await?;
        }
        self.save_sessions(&sessions).await?;

        tracing::info!(session_id = %session_id, "Deleted session");

        Ok(())
    }

    /// Open a session's tabs, optionally replacing the window's tabs, and
    /// mark it active. A session none of whose tabs could be opened is not
    /// marked active.
    pub async fn restore(&self, session_id: &str, close_current_tabs: bool) -> Result<RestoreOutcome> {
        let session = self.get(session_id).await?;

        let tabs = reconciler::safe_tabs(&session.tabs);
        if tabs.is_empty() {
            return Err(SessionError::NoRestorableTabs);
        }

        let report = reconciler::restore_tabs(self.tabs.as_ref(), &tabs, close_current_tabs).await?;
        if report.opened > 0 {
            self.set_active_session_id(Some(session_id)).await?;
        }

        let outcome = RestoreOutcome {
            skipped: session.tab_count() - tabs.len(),
            failed: report.failed,
        };

        tracing::info!(
            session_id = %session.id,
            session_name = %session.name,
            opened = report.opened,
            skipped = outcome.skipped,
            failed = outcome.failed,
            close_current_tabs,
            "Restored session"
        );

        Ok(outcome)
    }

    /// The full collection as stored, unsafe tabs included
    pub async fn export_all(&self) -> Result<SessionCollection> {
        self.load_sessions().await
    }

    /// Merge a `{"sessions": {...}}` backup into the store.
    ///
    /// Ids already present are never overwritten. Malformed records are
    /// skipped. A payload of any other shape is rejected without writing.
    pub async fn import_merge(&self, payload: &Value) -> Result<ImportOutcome> {
        let incoming = payload
            .as_object()
            .and_then(|root| root.get(SESSIONS_KEY))
            .and_then(Value::as_object)
            .ok_or_else(|| {
                SessionError::InvalidFormat("expected an object with a \"sessions\" map".to_string())
            })?;

        let mut sessions = self.load_sessions().await?;
        let mut outcome = ImportOutcome::default();

        for (id, record) in incoming {
            if sessions.contains_key(id) {
                tracing::debug!(session_id = %id, "Skipping import of existing session");
                outcome.skipped += 1;
                continue;
            }

            let Some(session) = parse_imported(id, record) else {
                tracing::warn!(session_id = %id, "Skipping malformed session in import");
                outcome.skipped += 1;
                continue;
            };

            sessions.insert(id.clone(), session);
            outcome.imported += 1;
        }

        if outcome.imported > 0 {
            self.save_sessions(&sessions).await?;
        }

        tracing::info!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            "Imported sessions"
        );

        Ok(outcome)
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tabs: Arc::clone(&self.tabs),
        }
    }
}

/// Validate one imported record: `id` and `name` strings, numeric
/// `createdAt`, `tabs` array. Unsafe tabs are dropped; the record is stored
/// under the id it was keyed by.
fn parse_imported(id: &str, record: &Value) -> Option<Session> {
    let fields = record.as_object()?;
    fields.get("id")?.as_str()?;
    let name = fields.get("name")?.as_str()?;
    let created_at = timestamp(fields.get("createdAt")?)?;
    let tabs: Vec<TabRecord> = fields
        .get("tabs")?
        .as_array()?
        .iter()
        .map(parse_tab)
        .collect();

    Some(Session {
        id: id.to_string(),
        name: name.to_string(),
        created_at,
        tabs: reconciler::safe_tabs(&tabs),
    })
}

fn timestamp(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|ms| ms as i64))
}

/// Malformed tabs become empty-URL records, which the safe filter drops
fn parse_tab(value: &Value) -> TabRecord {
    let empty = Map::new();
    let fields = value.as_object().unwrap_or(&empty);
    let text = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    TabRecord::new(text("url"), text("title"))
}

//! Application facade
//!
//! Owns the session store for one browser profile and exposes every
//! session operation, plus backups to and from files.

use chrono::Local;
use serde_json::Value;
use std::path::{Path, PathBuf};

use tabkeep_session::{
    ImportOutcome, RestoreOutcome, Session, SessionCollection, SessionEntry, SessionStore,
    StoredState,
};
use tabkeep_storage::{KeyValueStore, SqliteStore};
use tabkeep_tabs::TabControl;

use crate::backup::{backup_file_name, parse_backup, render_backup};
use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

pub struct TabKeep {
    /// Configuration
    config: Config,
    /// Session store
    sessions: SessionStore,
}

impl TabKeep {
    /// Open the on-disk store named by `config`
    pub fn open<T>(config: Config, tabs: T) -> Result<Self>
    where
        T: TabControl + 'static,
    {
        if config.database_path.as_os_str().is_empty() {
            return Err(CoreError::Config("database path is empty".to_string()));
        }

        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = SqliteStore::open(&config.database_path)?;

        tracing::info!(database = %config.database_path.display(), "Opened session store");

        Ok(Self::with_store(config, store, tabs))
    }

    /// Use an already-open store
    pub fn with_store<S, T>(config: Config, store: S, tabs: T) -> Self
    where
        S: KeyValueStore + 'static,
        T: TabControl + 'static,
    {
        Self {
            config,
            sessions: SessionStore::new(store, tabs),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }

    // === Session operations ===

    pub async fn get_all(&self) -> Result<StoredState> {
        Ok(self.sessions.get_all().await?)
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        Ok(self.sessions.list().await?)
    }

    pub async fn overview(&self) -> Result<Vec<SessionEntry>> {
        Ok(self.sessions.overview().await?)
    }

    /// Whether the window has drifted from the active session
    pub async fn has_unsaved_changes(&self) -> Result<bool> {
        Ok(self.sessions.has_unsaved_changes().await?)
    }

    pub async fn save_session(&self, name: &str) -> Result<Session> {
        Ok(self.sessions.create(name).await?)
    }

    pub async fn update_session(&self, session_id: &str) -> Result<Session> {
        Ok(self.sessions.update(session_id).await?)
    }

    pub async fn rename_session(&self, session_id: &str, name: &str) -> Result<()> {
        Ok(self.sessions.rename(session_id, name).await?)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        Ok(self.sessions.delete(session_id).await?)
    }

    pub async fn restore_session(
        &self,
        session_id: &str,
        close_current_tabs: bool,
    ) -> Result<RestoreOutcome> {
        Ok(self.sessions.restore(session_id, close_current_tabs).await?)
    }

    pub async fn export_all(&self) -> Result<SessionCollection> {
        Ok(self.sessions.export_all().await?)
    }

    pub async fn import_merge(&self, payload: &Value) -> Result<ImportOutcome> {
        Ok(self.sessions.import_merge(payload).await?)
    }

    // === Backups ===

    /// Write every session to a dated backup file in `dir`, or in the
    /// configured export directory. Returns the written path.
    pub async fn export_to_file(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let dir = dir.unwrap_or(self.config.export_dir.as_path());
        let sessions = self.sessions.export_all().await?;
        let text = render_backup(&sessions)?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(backup_file_name(Local::now().date_naive()));
        tokio::fs::write(&path, text).await?;

        tracing::info!(
            path = %path.display(),
            session_count = sessions.len(),
            "Exported sessions"
        );

        Ok(path)
    }

    /// Merge the sessions of a backup file into the store
    pub async fn import_from_file(&self, path: &Path) -> Result<ImportOutcome> {
        let text = tokio::fs::read_to_string(path).await?;
        let payload = parse_backup(&text)?;
        let outcome = self.sessions.import_merge(&payload).await?;

        tracing::info!(
            path = %path.display(),
            imported = outcome.imported,
            "Imported backup file"
        );

        Ok(outcome)
    }
}

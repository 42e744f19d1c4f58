//! TabKeep Core
//!
//! Wires the session store to on-disk storage and the host's tab surface,
//! and adds file backups on top.

mod app;
mod backup;
mod config;
mod error;

pub use app::TabKeep;
pub use backup::{backup_file_name, parse_backup, render_backup};
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use tabkeep_session::{
    reconciler, ErrorKind, ImportOutcome, RestoreOutcome, Session, SessionCollection,
    SessionEntry, SessionError, SessionStatus, SessionStore, StoredState,
};
pub use tabkeep_storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
pub use tabkeep_tabs::{LiveTab, MemoryWindow, TabControl, TabError, TabId, TabRecord};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("No tabs to save (internal pages are skipped)")]
    NoSaveableTabs,

    #[error("No tabs to restore (internal pages are skipped)")]
    NoRestorableTabs,

    #[error("Invalid backup file: {0}")]
    InvalidFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] tabkeep_storage::StorageError),

    #[error("Tab error: {0}")]
    Tab(#[from] tabkeep_tabs::TabError),
}

/// Failure categories reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    NoSaveableTabs,
    NoRestorableTabs,
    InvalidFormat,
    HostOperation,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Validation(_) => ErrorKind::Validation,
            SessionError::NotFound(_) => ErrorKind::NotFound,
            SessionError::NoSaveableTabs => ErrorKind::NoSaveableTabs,
            SessionError::NoRestorableTabs => ErrorKind::NoRestorableTabs,
            SessionError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            SessionError::Storage(_) | SessionError::Tab(_) => ErrorKind::HostOperation,
        }
    }
}

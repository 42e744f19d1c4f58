//! TabKeep Session Management
//!
//! - A Session is a named, timestamped list of tabs captured from a window
//! - Sessions can be restored into the window, alongside or replacing its tabs
//! - One session at a time may be marked active (the one last restored)
//! - Sessions are local-only and can be exported to / merged from a backup

mod error;
pub mod reconciler;
mod session;
mod store;

pub use error::{ErrorKind, SessionError};
pub use reconciler::{RestoreReport, SessionStatus};
pub use session::{Session, SessionCollection};
pub use store::{
    ImportOutcome, RestoreOutcome, SessionEntry, SessionStore, StoredState, ACTIVE_SESSION_KEY,
    SESSIONS_KEY,
};

pub type Result<T> = std::result::Result<T, SessionError>;

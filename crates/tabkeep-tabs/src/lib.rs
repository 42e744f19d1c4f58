//! TabKeep Tabs
//!
//! Tab records as captured into sessions, and the host surface used to
//! enumerate, open and close tabs in the current window.

mod control;
mod error;
mod tab;
mod window;

pub use control::TabControl;
pub use error::TabError;
pub use tab::{LiveTab, TabId, TabRecord};
pub use window::{MemoryWindow, WindowEvent};

pub type Result<T> = std::result::Result<T, TabError>;

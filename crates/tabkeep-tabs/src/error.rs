//! Tab error types

use thiserror::Error;

use crate::tab::TabId;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Tab not found: {0}")]
    NotFound(TabId),

    #[error("Tab host error: {0}")]
    Host(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

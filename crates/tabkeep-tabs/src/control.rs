//! Host tab-control surface

use async_trait::async_trait;
use std::sync::Arc;

use crate::tab::{LiveTab, TabId};
use crate::Result;

/// Enumerates, opens and closes tabs in the current browser window.
///
/// Every call may fail (throttling, rejected URLs, tabs closed underneath
/// us); failures are reported, never swallowed.
#[async_trait]
pub trait TabControl: Send + Sync {
    /// List the tabs of the current window in window order.
    async fn list_tabs(&self) -> Result<Vec<LiveTab>>;

    /// Open a tab at the end of the window. `active` brings it to the foreground.
    async fn create_tab(&self, url: &str, active: bool) -> Result<LiveTab>;

    /// Close the given tabs.
    async fn remove_tabs(&self, ids: &[TabId]) -> Result<()>;
}

#[async_trait]
impl<T: TabControl + ?Sized> TabControl for Arc<T> {
    async fn list_tabs(&self) -> Result<Vec<LiveTab>> {
        (**self).list_tabs().await
    }

    async fn create_tab(&self, url: &str, active: bool) -> Result<LiveTab> {
        (**self).create_tab(url, active).await
    }

    async fn remove_tabs(&self, ids: &[TabId]) -> Result<()> {
        (**self).remove_tabs(ids).await
    }
}

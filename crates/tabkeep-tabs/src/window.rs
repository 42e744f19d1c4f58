//! In-process window
//!
//! Implements the tab-control surface over a plain tab list. Records every
//! mutation and the smallest tab count the window ever reached, so callers
//! can check the window was never emptied mid-operation.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::control::TabControl;
use crate::error::TabError;
use crate::tab::{LiveTab, TabId};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Created { id: TabId, url: String, active: bool },
    Removed { ids: Vec<TabId> },
}

#[derive(Debug, Default)]
struct WindowState {
    tabs: Vec<LiveTab>,
    active: Option<TabId>,
    next_id: u64,
    events: Vec<WindowEvent>,
    min_tab_count: Option<usize>,
    rejected_urls: HashSet<String>,
    fail_listing: bool,
}

impl WindowState {
    fn record(&mut self, event: WindowEvent) {
        self.events.push(event);
        let count = self.tabs.len();
        self.min_tab_count = Some(self.min_tab_count.map_or(count, |min| min.min(count)));
    }
}

pub struct MemoryWindow {
    state: Arc<Mutex<WindowState>>,
}

impl MemoryWindow {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState::default())),
        }
    }

    /// Create a window already holding `(url, title)` tabs. The first is active.
    pub fn with_tabs(tabs: &[(&str, &str)]) -> Self {
        let window = Self::new();
        {
            let mut state = window.state.lock();
            for (url, title) in tabs {
                state.next_id += 1;
                let id = TabId::new(state.next_id);
                state.tabs.push(LiveTab {
                    id,
                    url: url.to_string(),
                    title: title.to_string(),
                });
            }
            state.active = state.tabs.first().map(|t| t.id);
        }
        window
    }

    /// Make the host reject tab creation for `url`.
    pub fn reject_url(&self, url: &str) {
        self.state.lock().rejected_urls.insert(url.to_string());
    }

    /// Make tab enumeration fail.
    pub fn set_fail_listing(&self, fail: bool) {
        self.state.lock().fail_listing = fail;
    }

    pub fn tabs(&self) -> Vec<LiveTab> {
        self.state.lock().tabs.clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.state.lock().tabs.iter().map(|t| t.url.clone()).collect()
    }

    pub fn active_tab(&self) -> Option<LiveTab> {
        let state = self.state.lock();
        let active = state.active?;
        state.tabs.iter().find(|t| t.id == active).cloned()
    }

    pub fn events(&self) -> Vec<WindowEvent> {
        self.state.lock().events.clone()
    }

    /// Smallest tab count seen after any mutation, `None` if nothing changed.
    pub fn min_tab_count(&self) -> Option<usize> {
        self.state.lock().min_tab_count
    }
}

impl Default for MemoryWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryWindow {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl TabControl for MemoryWindow {
    async fn list_tabs(&self) -> Result<Vec<LiveTab>> {
        let state = self.state.lock();
        if state.fail_listing {
            return Err(TabError::Host("tab enumeration unavailable".to_string()));
        }
        Ok(state.tabs.clone())
    }

    async fn create_tab(&self, url: &str, active: bool) -> Result<LiveTab> {
        if url.is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let mut state = self.state.lock();
        if state.rejected_urls.contains(url) {
            return Err(TabError::Host(format!("cannot open {url}")));
        }

        state.next_id += 1;
        let tab = LiveTab {
            id: TabId::new(state.next_id),
            url: url.to_string(),
            title: String::new(),
        };
        state.tabs.push(tab.clone());
        if active || state.active.is_none() {
            state.active = Some(tab.id);
        }
        state.record(WindowEvent::Created {
            id: tab.id,
            url: tab.url.clone(),
            active,
        });

        Ok(tab)
    }

    async fn remove_tabs(&self, ids: &[TabId]) -> Result<()> {
        let mut state = self.state.lock();

        // The whole batch is rejected if any id is unknown
        if let Some(missing) = ids
            .iter()
            .find(|id| !state.tabs.iter().any(|t| t.id == **id))
        {
            return Err(TabError::NotFound(*missing));
        }

        state.tabs.retain(|t| !ids.contains(&t.id));
        if state.active.is_some_and(|active| ids.contains(&active)) {
            state.active = state.tabs.last().map(|t| t.id);
        }
        state.record(WindowEvent::Removed { ids: ids.to_vec() });

        Ok(())
    }
}

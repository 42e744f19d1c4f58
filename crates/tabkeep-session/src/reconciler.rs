//! Session reconciliation
//!
//! Stateless rules shared by every session operation:
//! - which tab URLs may be stored and reopened
//! - how a stored session relates to the tabs open right now
//! - the order of host calls used to put a session back into the window

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use tabkeep_tabs::{LiveTab, TabControl, TabId, TabRecord};

/// URL prefixes that are never stored or reopened: browser-internal pages,
/// extension pages, script URLs and inline data.
const UNSAFE_URL_PREFIXES: &[&str] = &[
    // Browser internals
    "chrome://",
    "edge://",
    "brave://",
    "opera://",
    "vivaldi://",
    "about:",
    "view-source:",
    // Extension pages
    "chrome-extension://",
    "moz-extension://",
    "extension://",
    // Script injection
    "javascript:",
    // Inline data
    "data:",
    "blob:",
];

/// A URL is safe when it is non-empty and outside the internal schemes.
/// Scheme matching ignores case, as browsers do.
pub fn is_safe_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }

    let lower = url.trim_start().to_ascii_lowercase();
    !UNSAFE_URL_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Keep only the safe tabs, preserving order.
pub fn safe_tabs(tabs: &[TabRecord]) -> Vec<TabRecord> {
    tabs.iter()
        .filter(|tab| is_safe_url(&tab.url))
        .cloned()
        .collect()
}

/// Turn the live window into storable records, dropping unsafe tabs.
pub fn capture(live: &[LiveTab]) -> Vec<TabRecord> {
    live.iter()
        .filter(|tab| is_safe_url(&tab.url))
        .map(TabRecord::from)
        .collect()
}

/// How a stored session relates to the tabs currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Active session, window matches it
    Clean,
    /// Active session, window has drifted from it
    Modified,
    /// Not the active session, but the window happens to match it
    Exact,
    /// Neither active nor matching
    Inactive,
}

impl SessionStatus {
    /// Whether the window holds changes the active session has not saved
    pub fn has_unsaved_changes(&self) -> bool {
        matches!(self, SessionStatus::Modified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Clean => "clean",
            SessionStatus::Modified => "modified",
            SessionStatus::Exact => "exact",
            SessionStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a session from its stored URLs against the live URL set.
///
/// Comparison is on URL sets: order, duplicates and titles are ignored.
/// A session with no stored tabs never matches.
pub fn classify<'a, I>(stored_urls: I, live_urls: &HashSet<&str>, is_active: bool) -> SessionStatus
where
    I: IntoIterator<Item = &'a str>,
{
    let stored: HashSet<&str> = stored_urls.into_iter().collect();
    let matches = !stored.is_empty()
        && stored.len() == live_urls.len()
        && stored.iter().all(|url| live_urls.contains(url));

    match (is_active, matches) {
        (true, true) => SessionStatus::Clean,
        (true, false) => SessionStatus::Modified,
        (false, true) => SessionStatus::Exact,
        (false, false) => SessionStatus::Inactive,
    }
}

/// Result of putting a session's tabs into the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    /// Tabs the host opened
    pub opened: usize,
    /// Tabs the host refused to open (only on the non-replacing path)
    pub failed: usize,
}

/// Open `tabs` in the window.
///
/// Without `close_current`, every tab is opened in the background and the
/// live tabs stay; one refused tab does not stop the others.
///
/// With `close_current`, the window is replaced in three strict phases so it
/// never reaches zero tabs: open the first tab in the foreground, then close
/// every tab that was open before, then open the rest in the background.
/// Any host failure aborts the sequence; a failed anchor leaves the old tabs
/// untouched.
pub async fn restore_tabs<T>(
    control: &T,
    tabs: &[TabRecord],
    close_current: bool,
) -> tabkeep_tabs::Result<RestoreReport>
where
    T: TabControl + ?Sized,
{
    if close_current {
        replace_window(control, tabs).await
    } else {
        Ok(open_all(control, tabs).await)
    }
}

async fn open_all<T>(control: &T, tabs: &[TabRecord]) -> RestoreReport
where
    T: TabControl + ?Sized,
{
    let results = join_all(tabs.iter().map(|tab| control.create_tab(&tab.url, false))).await;

    let mut report = RestoreReport::default();
    for (tab, result) in tabs.iter().zip(results) {
        match result {
            Ok(_) => report.opened += 1,
            Err(e) => {
                tracing::warn!(url = %tab.url, error = %e, "Failed to open tab");
                report.failed += 1;
            }
        }
    }
    report
}

async fn replace_window<T>(control: &T, tabs: &[TabRecord]) -> tabkeep_tabs::Result<RestoreReport>
where
    T: TabControl + ?Sized,
{
    let Some((anchor, rest)) = tabs.split_first() else {
        return Ok(RestoreReport::default());
    };

    let existing: Vec<TabId> = control
        .list_tabs()
        .await?
        .into_iter()
        .map(|tab| tab.id)
        .collect();

    control.create_tab(&anchor.url, true).await?;
    tracing::debug!(url = %anchor.url, "Opened anchor tab");

    if !existing.is_empty() {
        control.remove_tabs(&existing).await?;
        tracing::debug!(closed = existing.len(), "Closed previous tabs");
    }

    for tab in rest {
        control.create_tab(&tab.url, false).await?;
    }
    tracing::debug!(opened = tabs.len(), "Filled window from session");

    Ok(RestoreReport {
        opened: tabs.len(),
        failed: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabkeep_tabs::{MemoryWindow, WindowEvent};

    fn records(urls: &[&str]) -> Vec<TabRecord> {
        urls.iter().map(|url| TabRecord::new(*url, "")).collect()
    }

    #[test]
    fn test_unsafe_urls() {
        assert!(is_safe_url("https://example.com"));
        assert!(is_safe_url("http://localhost:3000"));
        assert!(is_safe_url("file:///home/user/notes.html"));

        assert!(!is_safe_url(""));
        assert!(!is_safe_url("   "));
        assert!(!is_safe_url("chrome://settings"));
        assert!(!is_safe_url("chrome-extension://abcdef/popup.html"));
        assert!(!is_safe_url("moz-extension://abcdef/popup.html"));
        assert!(!is_safe_url("about:blank"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("JavaScript:alert(1)"));
        assert!(!is_safe_url(" javascript:alert(1)"));
        assert!(!is_safe_url("data:text/html,<h1>hi</h1>"));
    }

    #[test]
    fn test_safe_filter_is_idempotent() {
        let tabs = records(&[
            "https://a.com",
            "chrome://newtab",
            "https://b.com",
            "data:text/plain,x",
            "",
            "https://a.com",
        ]);

        let once = safe_tabs(&tabs);
        assert_eq!(once, records(&["https://a.com", "https://b.com", "https://a.com"]));
        assert_eq!(safe_tabs(&once), once);
    }

    #[test]
    fn test_capture_drops_internal_pages() {
        let live = vec![
            LiveTab {
                id: TabId::new(1),
                url: "https://a.com".to_string(),
                title: "A".to_string(),
            },
            LiveTab {
                id: TabId::new(2),
                url: "chrome://settings".to_string(),
                title: "Settings".to_string(),
            },
        ];
        assert_eq!(capture(&live), vec![TabRecord::new("https://a.com", "A")]);
    }

    #[test]
    fn test_classify() {
        let live: HashSet<&str> = ["https://a.com", "https://b.com"].into_iter().collect();

        assert_eq!(
            classify(["https://b.com", "https://a.com"], &live, true),
            SessionStatus::Clean
        );
        assert_eq!(
            classify(["https://a.com"], &live, true),
            SessionStatus::Modified
        );
        assert_eq!(
            classify(["https://a.com", "https://b.com"], &live, false),
            SessionStatus::Exact
        );
        assert_eq!(
            classify(["https://a.com", "https://c.com"], &live, false),
            SessionStatus::Inactive
        );
    }

    #[test]
    fn test_classify_ignores_duplicates() {
        let live: HashSet<&str> = ["https://a.com", "https://b.com"].into_iter().collect();
        assert_eq!(
            classify(["https://a.com", "https://a.com", "https://b.com"], &live, true),
            SessionStatus::Clean
        );
    }

    #[test]
    fn test_empty_session_never_matches() {
        let live: HashSet<&str> = HashSet::new();
        assert_eq!(classify(std::iter::empty(), &live, true), SessionStatus::Modified);
        assert_eq!(classify(std::iter::empty(), &live, false), SessionStatus::Inactive);
    }

    #[tokio::test]
    async fn test_open_all_keeps_live_tabs() {
        let window = MemoryWindow::with_tabs(&[("https://x.com", "X")]);
        let report = restore_tabs(&window, &records(&["https://a.com", "https://b.com"]), false)
            .await
            .unwrap();

        assert_eq!(report, RestoreReport { opened: 2, failed: 0 });
        assert_eq!(window.urls(), vec!["https://x.com", "https://a.com", "https://b.com"]);
        assert_eq!(window.active_tab().unwrap().url, "https://x.com");
    }

    #[tokio::test]
    async fn test_open_all_is_best_effort() {
        let window = MemoryWindow::new();
        window.reject_url("https://b.com");

        let report = restore_tabs(
            &window,
            &records(&["https://a.com", "https://b.com", "https://c.com"]),
            false,
        )
        .await
        .unwrap();

        assert_eq!(report, RestoreReport { opened: 2, failed: 1 });
        assert_eq!(window.urls(), vec!["https://a.com", "https://c.com"]);
    }

    #[tokio::test]
    async fn test_replace_window_order() {
        let window = MemoryWindow::with_tabs(&[("https://x.com", "X"), ("https://y.com", "Y")]);
        let old: Vec<TabId> = window.tabs().iter().map(|t| t.id).collect();

        restore_tabs(
            &window,
            &records(&["https://a.com", "https://b.com", "https://c.com"]),
            true,
        )
        .await
        .unwrap();

        let events = window.events();
        assert_eq!(events.len(), 4);
        assert!(matches!(
            &events[0],
            WindowEvent::Created { url, active: true, .. } if url == "https://a.com"
        ));
        assert_eq!(events[1], WindowEvent::Removed { ids: old });
        assert!(matches!(
            &events[2],
            WindowEvent::Created { url, active: false, .. } if url == "https://b.com"
        ));
        assert!(matches!(
            &events[3],
            WindowEvent::Created { url, active: false, .. } if url == "https://c.com"
        ));

        assert_eq!(window.urls(), vec!["https://a.com", "https://b.com", "https://c.com"]);
        assert_eq!(window.active_tab().unwrap().url, "https://a.com");
        assert!(window.min_tab_count().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_replace_window_single_tab_never_empties() {
        let window = MemoryWindow::with_tabs(&[("https://x.com", "X")]);
        restore_tabs(&window, &records(&["https://a.com"]), true)
            .await
            .unwrap();

        assert_eq!(window.urls(), vec!["https://a.com"]);
        assert_eq!(window.min_tab_count(), Some(1));
    }

    #[tokio::test]
    async fn test_replace_empty_window() {
        let window = MemoryWindow::new();
        restore_tabs(&window, &records(&["https://a.com", "https://b.com"]), true)
            .await
            .unwrap();

        assert_eq!(window.urls(), vec!["https://a.com", "https://b.com"]);
        assert!(window
            .events()
            .iter()
            .all(|e| matches!(e, WindowEvent::Created { .. })));
    }

    #[tokio::test]
    async fn test_failed_anchor_keeps_old_tabs() {
        let window = MemoryWindow::with_tabs(&[("https://x.com", "X")]);
        window.reject_url("https://a.com");

        let result = restore_tabs(&window, &records(&["https://a.com", "https://b.com"]), true).await;

        assert!(result.is_err());
        assert_eq!(window.urls(), vec!["https://x.com"]);
        assert!(window.events().is_empty());
    }
}

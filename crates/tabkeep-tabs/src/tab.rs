//! Tab data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned identifier of a live tab.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TabId(u64);

impl TabId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tab as it is open in the window right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveTab {
    pub id: TabId,
    pub url: String,
    pub title: String,
}

/// A tab as stored inside a session.
///
/// Tabs have no identity beyond their URL: two records with the same URL
/// are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl TabRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

impl From<&LiveTab> for TabRecord {
    fn from(tab: &LiveTab) -> Self {
        Self {
            url: tab.url.clone(),
            title: tab.title.clone(),
        }
    }
}

impl From<LiveTab> for TabRecord {
    fn from(tab: LiveTab) -> Self {
        Self {
            url: tab.url,
            title: tab.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_title_deserializes_empty() {
        let tab: TabRecord = serde_json::from_str(r#"{"url":"https://a.com"}"#).unwrap();
        assert_eq!(tab, TabRecord::new("https://a.com", ""));
    }

    #[test]
    fn test_record_from_live_tab_drops_id() {
        let live = LiveTab {
            id: TabId::new(7),
            url: "https://a.com".to_string(),
            title: "A".to_string(),
        };
        assert_eq!(TabRecord::from(&live), TabRecord::new("https://a.com", "A"));
    }
}

//! Session data structure

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use tabkeep_tabs::TabRecord;

/// All sessions keyed by id. Iteration order carries no meaning.
pub type SessionCollection = HashMap<String, Session>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier, never reused
    pub id: String,
    /// Human-readable name, not required to be unique
    pub name: String,
    /// Creation time in Unix epoch milliseconds
    pub created_at: i64,
    /// Tabs in capture order; the first one anchors a replacing restore
    pub tabs: Vec<TabRecord>,
}

impl Session {
    pub fn new(name: String, tabs: Vec<TabRecord>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now().timestamp_millis(),
            tabs,
        }
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub fn replace_tabs(&mut self, tabs: Vec<TabRecord>) {
        self.tabs = tabs;
    }

    /// Get the number of tabs
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(|t| t.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = Session::new("Work".to_string(), vec![TabRecord::new("https://a.com", "A")]);
        assert_eq!(session.name, "Work");
        assert_eq!(session.tab_count(), 1);
        assert!(Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn test_serialized_field_names() {
        let session = Session {
            id: "id1".to_string(),
            name: "Work".to_string(),
            created_at: 1,
            tabs: vec![],
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": "id1", "name": "Work", "createdAt": 1, "tabs": []})
        );
    }

    #[test]
    fn test_rename_and_replace_touch_one_field() {
        let mut session = Session::new("Work".to_string(), vec![TabRecord::new("https://a.com", "")]);
        let before = session.clone();

        session.rename("Home".to_string());
        assert_eq!(session.tabs, before.tabs);
        assert_eq!(session.created_at, before.created_at);

        session.replace_tabs(vec![]);
        assert_eq!(session.name, "Home");
        assert_eq!(session.id, before.id);
    }
}

//! Backup files
//!
//! A backup is a UTF-8 JSON document `{"sessions": {<id>: <session>, ...}}`,
//! written with two-space indentation.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use tabkeep_session::{SessionCollection, SessionError};

use crate::Result;

#[derive(Serialize)]
struct BackupDocument<'a> {
    sessions: &'a SessionCollection,
}

pub fn render_backup(sessions: &SessionCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(&BackupDocument { sessions })?)
}

/// Parse backup text. Text that is not JSON is an invalid backup; the shape
/// itself is checked by the import.
pub fn parse_backup(text: &str) -> Result<Value> {
    serde_json::from_str(text)
        .map_err(|e| SessionError::InvalidFormat(format!("not valid JSON: {e}")).into())
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("tab-sessions-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use tabkeep_session::{ErrorKind, Session};
    use tabkeep_tabs::TabRecord;

    #[test]
    fn test_render_uses_two_space_indent() {
        let mut sessions = SessionCollection::new();
        sessions.insert(
            "id1".to_string(),
            Session {
                id: "id1".to_string(),
                name: "Work".to_string(),
                created_at: 1,
                tabs: vec![TabRecord::new("https://a.com", "A")],
            },
        );

        let text = render_backup(&sessions).unwrap();
        assert!(text.starts_with("{\n  \"sessions\": {\n    \"id1\": {"));

        let value = parse_backup(&text).unwrap();
        assert_eq!(value["sessions"]["id1"]["createdAt"], 1);
    }

    #[test]
    fn test_garbage_is_invalid_format() {
        match parse_backup("not json") {
            Err(CoreError::Session(e)) => assert_eq!(e.kind(), ErrorKind::InvalidFormat),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(backup_file_name(date), "tab-sessions-2024-03-07.json");
    }
}

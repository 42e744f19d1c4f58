//! SQLite-backed key-value store

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::store::KeyValueStore;
use crate::Result;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode so a crashed writer never leaves a torn value behind
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    fn read_value(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self.with_connection(|conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn write_value(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let updated_at = Utc::now().to_rfc3339();

        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, text, updated_at],
            )?;
            Ok(())
        })?;

        tracing::debug!(key = %key, bytes = text.len(), "Stored value");

        Ok(())
    }

    fn delete_value(&self, key: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            Ok(())
        })
    }
}

impl Clone for SqliteStore {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.read_value(key)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.write_value(key, &value)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.delete_value(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("sessions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_whole_value() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .set("sessions", json!({"a": {"name": "Work"}, "b": {"name": "Home"}}))
            .await
            .unwrap();
        store
            .set("sessions", json!({"b": {"name": "Home"}}))
            .await
            .unwrap();

        assert_eq!(
            store.get("sessions").await.unwrap(),
            Some(json!({"b": {"name": "Home"}}))
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("activeSessionId", json!("abc")).await.unwrap();
        store.remove("activeSessionId").await.unwrap();
        store.remove("activeSessionId").await.unwrap();
        assert_eq!(store.get("activeSessionId").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabkeep.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("activeSessionId", json!("abc")).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("activeSessionId").await.unwrap(),
            Some(json!("abc"))
        );
    }
}

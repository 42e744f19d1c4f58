//! In-process key-value store

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::StorageError;
use crate::store::KeyValueStore;
use crate::Result;

/// Map-backed store. Clones share the same underlying map.
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
    /// When set, every write is rejected as the host would on quota exhaustion
    fail_writes: Arc<AtomicBool>,
    /// Keys whose writes are rejected
    rejected_keys: Arc<RwLock<HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
            rejected_keys: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Reject writes to `key` only.
    pub fn reject_writes_to(&self, key: &str) {
        self.rejected_keys.write().insert(key.to_string());
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) || self.rejected_keys.read().contains(key) {
            return Err(StorageError::Host("storage quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            fail_writes: Arc::clone(&self.fail_writes),
            rejected_keys: Arc::clone(&self.rejected_keys),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.check_writable(key)?;
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        self.values.write().remove(key);
        Ok(())
    }
}

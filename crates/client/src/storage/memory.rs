//! In-memory mirror.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{KeyValueMirror, StorageError};

/// Mirror backed by a shared in-process map.
///
/// Clones share the same map, so a test can keep a handle to inspect what a
/// store persisted, or hand the same map to a fresh store to simulate a
/// restart. [`MemoryMirror::set_unavailable`] makes every call fail.
#[derive(Debug, Clone)]
pub struct MemoryMirror {
    name: String,
    entries: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryMirror {
    /// Create an empty mirror.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(Mutex::new(HashMap::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Toggle simulated failure of every operation.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current value of a key, bypassing failure simulation.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Drop every key, as if the storage was wiped.
    pub async fn wipe(&self) {
        self.entries.lock().await.clear();
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "{} mirror is offline",
                self.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueMirror for MemoryMirror {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

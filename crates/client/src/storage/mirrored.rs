//! Precedence reads and write-to-all over several mirrors.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::{FileMirror, KeyValueMirror};
use crate::config::ClientConfig;

/// An ordered set of mirrors acting as one logical store.
///
/// - Reads return the value from the first mirror that has it; a failing
///   mirror is skipped.
/// - Writes and removals go to every mirror. Failures are logged and do not
///   stop the remaining mirrors.
///
/// Cloning is cheap and clones share the same mirrors.
#[derive(Clone)]
pub struct MirroredStore {
    mirrors: Arc<[Arc<dyn KeyValueMirror>]>,
}

impl MirroredStore {
    /// Create a store from mirrors listed in read-precedence order.
    #[must_use]
    pub fn new(mirrors: Vec<Arc<dyn KeyValueMirror>>) -> Self {
        Self {
            mirrors: mirrors.into(),
        }
    }

    /// Device mirror first, then the browser mirror when configured.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut mirrors: Vec<Arc<dyn KeyValueMirror>> = vec![Arc::new(FileMirror::new(
            "device",
            config.device_state_dir.clone(),
        ))];
        if let Some(dir) = &config.browser_state_dir {
            mirrors.push(Arc::new(FileMirror::new("browser", dir.clone())));
        }
        Self::new(mirrors)
    }

    /// Number of mirrors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    /// Whether there are no mirrors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    /// Read a key from the first mirror that holds it.
    pub async fn read(&self, key: &str) -> Option<String> {
        for mirror in self.mirrors.iter() {
            match mirror.get(key).await {
                Ok(Some(value)) => {
                    debug!(key, mirror = mirror.name(), "Read from storage mirror");
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => warn!(key, mirror = mirror.name(), error = %e, "Storage read failed"),
            }
        }
        None
    }

    /// Read several keys that belong together from a single mirror.
    ///
    /// Returns the values from the first mirror holding all of them. If no
    /// mirror is complete, returns whatever the first mirror holding any of
    /// them has, so the caller can see the partial state and discard it.
    pub async fn read_group<const N: usize>(&self, keys: [&str; N]) -> [Option<String>; N] {
        let mut partial: Option<[Option<String>; N]> = None;

        for mirror in self.mirrors.iter() {
            let mut values: [Option<String>; N] = std::array::from_fn(|_| None);
            let mut failed = false;
            for (slot, key) in values.iter_mut().zip(keys) {
                match mirror.get(key).await {
                    Ok(value) => *slot = value,
                    Err(e) => {
                        warn!(key, mirror = mirror.name(), error = %e, "Storage read failed");
                        failed = true;
                        break;
                    }
                }
            }
            if failed {
                continue;
            }
            if values.iter().all(Option::is_some) {
                debug!(?keys, mirror = mirror.name(), "Read key group from storage mirror");
                return values;
            }
            if partial.is_none() && values.iter().any(Option::is_some) {
                partial = Some(values);
            }
        }

        partial.unwrap_or_else(|| std::array::from_fn(|_| None))
    }

    /// Write a value to every mirror. Returns how many writes succeeded.
    pub async fn write(&self, key: &str, value: &str) -> usize {
        let mut written = 0;
        for mirror in self.mirrors.iter() {
            match mirror.set(key, value).await {
                Ok(()) => written += 1,
                Err(e) => warn!(key, mirror = mirror.name(), error = %e, "Storage write failed"),
            }
        }
        written
    }

    /// Serialize a value as JSON and write it to every mirror.
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> usize {
        match serde_json::to_string(value) {
            Ok(json) => self.write(key, &json).await,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize value for storage");
                0
            }
        }
    }

    /// Remove keys from every mirror.
    pub async fn remove(&self, keys: &[&str]) {
        for mirror in self.mirrors.iter() {
            for key in keys {
                if let Err(e) = mirror.remove(key).await {
                    warn!(key, mirror = mirror.name(), error = %e, "Storage remove failed");
                }
            }
        }
    }
}

impl std::fmt::Debug for MirroredStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.mirrors.iter().map(|m| m.name()))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryMirror;

    fn pair() -> (MemoryMirror, MemoryMirror, MirroredStore) {
        let device = MemoryMirror::new("device");
        let browser = MemoryMirror::new("browser");
        let store = MirroredStore::new(vec![Arc::new(device.clone()), Arc::new(browser.clone())]);
        (device, browser, store)
    }

    #[tokio::test]
    async fn test_read_prefers_first_mirror() {
        let (device, browser, store) = pair();
        device.set("cart", "device").await.unwrap();
        browser.set("cart", "browser").await.unwrap();
        assert_eq!(store.read("cart").await.as_deref(), Some("device"));
    }

    #[tokio::test]
    async fn test_read_falls_back_when_missing_or_failing() {
        let (device, browser, store) = pair();
        browser.set("cart", "browser").await.unwrap();
        assert_eq!(store.read("cart").await.as_deref(), Some("browser"));

        device.set("cart", "device").await.unwrap();
        device.set_unavailable(true);
        assert_eq!(store.read("cart").await.as_deref(), Some("browser"));
    }

    #[tokio::test]
    async fn test_write_reaches_all_and_survives_failures() {
        let (device, browser, store) = pair();
        browser.set_unavailable(true);
        assert_eq!(store.write("token", "t1").await, 1);
        assert_eq!(device.peek("token").await.as_deref(), Some("t1"));
        assert_eq!(browser.peek("token").await, None);

        browser.set_unavailable(false);
        assert_eq!(store.write("token", "t2").await, 2);
        assert_eq!(browser.peek("token").await.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn test_remove_clears_every_mirror() {
        let (device, browser, store) = pair();
        store.write("user", "{}").await;
        store.write("token", "t").await;
        store.remove(&["user", "token"]).await;
        for mirror in [&device, &browser] {
            assert_eq!(mirror.peek("user").await, None);
            assert_eq!(mirror.peek("token").await, None);
        }
    }

    #[tokio::test]
    async fn test_read_group_skips_incomplete_mirror() {
        let (device, browser, store) = pair();
        device.set("user", "{\"stale\":true}").await.unwrap();
        browser.set("user", "{}").await.unwrap();
        browser.set("token", "t").await.unwrap();

        let [user, token] = store.read_group(["user", "token"]).await;
        assert_eq!(user.as_deref(), Some("{}"));
        assert_eq!(token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_read_group_reports_partial_state() {
        let (device, _browser, store) = pair();
        device.set("user", "{}").await.unwrap();

        let [user, token] = store.read_group(["user", "token"]).await;
        assert!(user.is_some());
        assert!(token.is_none());
    }
}

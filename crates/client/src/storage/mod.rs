//! Durable key-value mirrors.
//!
//! The client keeps its persisted state (`token`, `user`, `cart`, `checkout`)
//! in one or more mirrors: a device store and, where the runtime has one, a
//! browser store. [`MirroredStore`] treats them as a single logical store:
//! reads go through the mirrors in precedence order, writes go to all of
//! them.
//!
//! # Implementations
//!
//! - [`FileMirror`] - one file per key in a directory
//! - [`MemoryMirror`] - in-process map, for tests and ephemeral sessions

mod file;
mod memory;
mod mirrored;

pub use file::FileMirror;
pub use memory::MemoryMirror;
pub use mirrored::MirroredStore;

use async_trait::async_trait;
use thiserror::Error;

/// Persisted keys.
pub mod keys {
    /// Bearer token, stored as the raw string.
    pub const TOKEN: &str = "token";

    /// Signed-in user profile (JSON).
    pub const USER: &str = "user";

    /// Cart lines (JSON array).
    pub const CART: &str = "cart";

    /// Pending checkout written before the payment redirect (JSON).
    pub const CHECKOUT: &str = "checkout";
}

/// Errors from a storage mirror.
///
/// Stores log these and carry on; they never reach store callers.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters the mirror cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The mirror cannot be reached right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}

/// One durable key-value mirror.
///
/// Removing a key that does not exist succeeds.
#[async_trait]
pub trait KeyValueMirror: Send + Sync {
    /// Short name used in logs (e.g. `device`, `browser`).
    fn name(&self) -> &str;

    /// Read a value, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

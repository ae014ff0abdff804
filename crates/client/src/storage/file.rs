//! Directory-backed mirror.
//!
//! Each key is stored in its own file:
//!
//! ```text
//! .cartwheel/device/
//! ├── cart
//! ├── token
//! └── user
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{KeyValueMirror, StorageError};

/// Mirror that keeps one file per key in a directory.
///
/// Writes go to a temporary file first and are then renamed into place, so
/// a crash mid-write leaves the previous value intact. The directory is
/// created on first write.
#[derive(Debug, Clone)]
pub struct FileMirror {
    name: String,
    dir: PathBuf,
}

impl FileMirror {
    /// Create a mirror rooted at `dir`.
    #[must_use]
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// Directory holding the key files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl KeyValueMirror for FileMirror {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        let temp_path = self.dir.join(format!(".{key}.tmp"));

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(key, e))?;
        fs::write(&temp_path, value)
            .await
            .map_err(|e| StorageError::io(key, e))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StorageError::io(key, e))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp = TempDir::new().unwrap();
        let mirror = FileMirror::new("device", temp.path().join("state"));

        assert_eq!(mirror.get("token").await.unwrap(), None);

        mirror.set("token", "abc").await.unwrap();
        assert_eq!(mirror.get("token").await.unwrap().as_deref(), Some("abc"));

        mirror.set("token", "def").await.unwrap();
        assert_eq!(mirror.get("token").await.unwrap().as_deref(), Some("def"));

        mirror.remove("token").await.unwrap();
        assert_eq!(mirror.get("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let temp = TempDir::new().unwrap();
        let mirror = FileMirror::new("device", temp.path());
        assert!(mirror.remove("cart").await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let mirror = FileMirror::new("device", temp.path());
        assert!(matches!(
            mirror.set("../escape", "x").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let mirror = FileMirror::new("device", temp.path());
        mirror.set("cart", "[]").await.unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(temp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["cart".to_string()]);
    }
}

//! Implements the `KeyValueStore` trait with a single JSON file on disk.

use crate::error::Res;
use crate::store::KeyValueStore;
use crate::utils;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::trace;

/// A `KeyValueStore` backed by one JSON object file, `{ "key": "value", ... }`.
///
/// Every `set` rewrites the whole file through a temporary file and a rename, so a failed write
/// leaves the previous file in place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles made through this handle.
    lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store that reads and writes `path`. The file is created on the first `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Res<BTreeMap<String, String>> {
        match utils::read_optional(&self.path).await? {
            None => Ok(BTreeMap::new()),
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse store file at {}", self.path.display())),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        trace!("get '{key}' from {}", self.path.display());
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Res<()> {
        trace!("set '{key}' in {}", self.path.display());
        let _guard = self.lock.lock().await;
        let mut data = self.read_all().await?;
        data.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&data).context("Unable to serialize store")?;
        utils::write_atomic(&self.path, json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_before_file_exists() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::new(&path);
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        utils::write(&path, "not json").await.unwrap();
        let store = FileStore::new(&path);
        let err = store.get("a").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse store file"));
    }

    #[tokio::test]
    async fn test_failed_set_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::new(&path);
        store.set("a", "1").await.unwrap();

        // A directory in the way of the temporary file makes the write fail.
        std::fs::create_dir(dir.path().join("store.json.tmp")).unwrap();
        assert!(store.set("a", "2").await.is_err());
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
    }
}

//! Implements the `KeyValueStore` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this library so that the ledger can
//! be used without touching the filesystem, e.g. in tests of code that depends on this crate.

use crate::error::Res;
use crate::store::KeyValueStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A `KeyValueStore` that holds its values in a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `MemoryStore` seeded with `data`.
    pub fn with_data(data: HashMap<String, String>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Res<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

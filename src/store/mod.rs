//! The persistence seam. The ledger only needs to get and set a string under a key; where that
//! string lives is up to the `KeyValueStore` implementation.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Res;

/// An asynchronous, string-keyed store of UTF-8 values.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing has been stored there.
    async fn get(&self, key: &str) -> Res<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value. If this fails, the previous
    /// value must still be readable.
    async fn set(&self, key: &str, value: &str) -> Res<()>;
}

//! The per-user transaction ledger.
//!
//! A ledger is a JSON array of `TransactionRecord` stored under one key of a `KeyValueStore`.
//! It only ever grows: `append` reads the whole array, pushes a record and writes the whole array
//! back. There is no locking, so two appends that overlap can lose one of the records; the last
//! write wins.

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{NewTransaction, TransactionRecord};
use crate::store::KeyValueStore;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, trace};

/// The namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "@gofinances";

/// Identifies one user's ledger within a store. Renders as
/// `{namespace}:transactions_user:{user_id}`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LedgerKey {
    namespace: String,
    user_id: String,
}

impl LedgerKey {
    pub fn new(namespace: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            user_id: user_id.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl Display for LedgerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:transactions_user:{}", self.namespace, self.user_id)
    }
}

/// Reads and appends the transaction records of one user.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    key: LedgerKey,
}

impl Ledger {
    pub fn new(store: Arc<dyn KeyValueStore>, key: LedgerKey) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &LedgerKey {
        &self.key
    }

    /// Returns every record in the order it was appended.
    ///
    /// A key that has never been written is an empty ledger. A value that is not a JSON array of
    /// records is an `ErrorType::StorageRead` error; nothing is skipped or repaired.
    pub async fn load(&self) -> Result<Vec<TransactionRecord>> {
        self.load_inner().await.pub_result(ErrorType::StorageRead)
    }

    /// Appends `record` and persists the full ledger.
    ///
    /// Read failures are reported as `ErrorType::StorageRead`, failures to persist as
    /// `ErrorType::StorageWrite`. Nothing is retried.
    pub async fn append(&self, record: TransactionRecord) -> Result<()> {
        let mut records = self.load().await?;
        records.push(record);
        self.save(&records).await.pub_result(ErrorType::StorageWrite)?;
        debug!("Ledger '{}' now holds {} records", self.key, records.len());
        Ok(())
    }

    /// Validates a form submission, stamps it with a new id and `now`, and appends it.
    ///
    /// Returns the stored record. A rejected submission is an `ErrorType::Validation` error and
    /// never touches the store.
    pub async fn register(
        &self,
        transaction: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<TransactionRecord> {
        let record = transaction
            .into_record(now)
            .context("The transaction cannot be registered")
            .pub_result(ErrorType::Validation)?;
        self.append(record.clone()).await?;
        Ok(record)
    }

    async fn load_inner(&self) -> Res<Vec<TransactionRecord>> {
        let key = self.key.to_string();
        trace!("Loading ledger '{key}'");
        let data = self
            .store
            .get(&key)
            .await
            .with_context(|| format!("Unable to read ledger '{key}'"))?;
        match data {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("Ledger '{key}' does not contain valid transactions")),
        }
    }

    async fn save(&self, records: &[TransactionRecord]) -> Res<()> {
        let key = self.key.to_string();
        let json = serde_json::to_string(records).context("Unable to serialize the ledger")?;
        self.store
            .set(&key, &json)
            .await
            .with_context(|| format!("Unable to write ledger '{key}'"))
    }
}

//! Holds the dashboard a screen is currently showing and decides which refresh gets to replace it.
//!
//! A screen reloads the ledger whenever it gains focus, so two loads can be in flight at once and
//! resolve in either order. Each refresh takes a `RefreshToken` when it starts; when it finishes,
//! its result is published only if no newer refresh has been started since. The transaction list
//! and the highlights are published together as one `Dashboard`.

use crate::aggregate::{aggregate, Dashboard};
use crate::format::Formatter;
use crate::ledger::Ledger;
use crate::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Identifies one refresh, in the order refreshes were started.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RefreshToken(u64);

/// The published state of a dashboard screen.
pub struct DashboardState {
    ledger: Ledger,
    formatter: Formatter,
    issued: AtomicU64,
    published: RwLock<Option<Arc<Dashboard>>>,
}

impl DashboardState {
    pub fn new(ledger: Ledger, formatter: Formatter) -> Self {
        Self {
            ledger,
            formatter,
            issued: AtomicU64::new(0),
            published: RwLock::new(None),
        }
    }

    /// Starts a refresh. Any refresh started earlier can no longer publish.
    pub fn begin_refresh(&self) -> RefreshToken {
        RefreshToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Publishes `dashboard` if `token` belongs to the most recently started refresh. Returns the
    /// published dashboard, or `None` if the refresh was superseded.
    pub async fn publish(
        &self,
        token: RefreshToken,
        dashboard: Dashboard,
    ) -> Option<Arc<Dashboard>> {
        let mut published = self.published.write().await;
        // Checked under the lock so that a stale result cannot slip in after a newer one.
        if token.0 != self.issued.load(Ordering::SeqCst) {
            debug!("Discarding dashboard from superseded refresh {}", token.0);
            return None;
        }
        let dashboard = Arc::new(dashboard);
        *published = Some(dashboard.clone());
        Some(dashboard)
    }

    /// Loads the ledger, aggregates it and publishes the result unless a newer refresh was started
    /// in the meantime. Returns the dashboard this refresh published, if any.
    ///
    /// A failed load publishes nothing; the previously published dashboard stays in place.
    pub async fn refresh(&self) -> Result<Option<Arc<Dashboard>>> {
        let token = self.begin_refresh();
        trace!("Refresh {} started for '{}'", token.0, self.ledger.key());
        let records = self.ledger.load().await?;
        let dashboard = aggregate(&records, &self.formatter);
        Ok(self.publish(token, dashboard).await)
    }

    /// The dashboard currently shown, or `None` before the first successful refresh.
    pub async fn current(&self) -> Option<Arc<Dashboard>> {
        self.published.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerKey, DEFAULT_NAMESPACE};
    use crate::error::{ErrorType, Res};
    use crate::model::{NewTransaction, TransactionType};
    use crate::store::{KeyValueStore, MemoryStore};
    use anyhow::bail;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::AtomicBool;

    /// A store whose reads can be switched off.
    #[derive(Default)]
    struct UnreadableStore {
        inner: MemoryStore,
        fail_reads: AtomicBool,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for UnreadableStore {
        async fn get(&self, key: &str) -> Res<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                bail!("the store is unreachable");
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Res<()> {
            self.inner.set(key, value).await
        }
    }

    fn state() -> (Ledger, DashboardState) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(store, LedgerKey::new(DEFAULT_NAMESPACE, "u1"));
        let state = DashboardState::new(ledger.clone(), Formatter::default());
        (ledger, state)
    }

    #[tokio::test]
    async fn test_refresh_publishes() {
        let (ledger, state) = state();
        assert!(state.current().await.is_none());

        let now = Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap();
        let form = NewTransaction::new("Salary", "100", TransactionType::Positive, "salary");
        ledger.register(form, now).await.unwrap();

        let dashboard = state.refresh().await.unwrap().unwrap();
        assert_eq!(dashboard.transactions.len(), 1);
        assert_eq!(dashboard.highlights.entries.amount, "R$100,00");
        assert_eq!(state.current().await, Some(dashboard));
    }

    #[tokio::test]
    async fn test_stale_refresh_cannot_overwrite() {
        let (ledger, state) = state();
        let old = state.begin_refresh();
        let stale = aggregate(&ledger.load().await.unwrap(), &Formatter::default());

        let now = Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap();
        let form = NewTransaction::new("Lunch", "25", TransactionType::Negative, "food");
        ledger.register(form, now).await.unwrap();

        let new = state.begin_refresh();
        let fresh = aggregate(&ledger.load().await.unwrap(), &Formatter::default());

        // The newer refresh resolves first, then the older one.
        let published = state.publish(new, fresh.clone()).await.unwrap();
        assert_eq!(*published, fresh);
        assert!(state.publish(old, stale).await.is_none());
        assert_eq!(state.current().await.as_deref(), Some(&fresh));
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_dropped_even_if_first() {
        let (ledger, state) = state();
        let old = state.begin_refresh();
        let _new = state.begin_refresh();
        let dashboard = aggregate(&ledger.load().await.unwrap(), &Formatter::default());
        assert!(state.publish(old, dashboard).await.is_none());
        assert!(state.current().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_published_dashboard() {
        let store = Arc::new(UnreadableStore::default());
        let ledger = Ledger::new(store.clone(), LedgerKey::new(DEFAULT_NAMESPACE, "u1"));
        let state = DashboardState::new(ledger.clone(), Formatter::default());

        let now = Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap();
        let form = NewTransaction::new("Salary", "100", TransactionType::Positive, "salary");
        ledger.register(form, now).await.unwrap();
        let first = state.refresh().await.unwrap().unwrap();

        store.fail_reads.store(true, Ordering::SeqCst);
        let err = state.refresh().await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageRead);
        assert_eq!(state.current().await, Some(first));
    }

    #[tokio::test]
    async fn test_refresh_returns_its_own_dashboard() {
        let (ledger, state) = state();
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap();
        let form = NewTransaction::new("Salary", "100", TransactionType::Positive, "salary");
        ledger.register(form, now).await.unwrap();

        let own = state.refresh().await.unwrap().unwrap();
        // A newer refresh publishing right after must not change what the first one returned.
        let newer = state.begin_refresh();
        let empty = aggregate(&[], &Formatter::default());
        state.publish(newer, empty.clone()).await.unwrap();

        assert_eq!(own.highlights.entries.amount, "R$100,00");
        assert_eq!(state.current().await.as_deref(), Some(&empty));
    }

    #[test]
    fn test_tokens_increase() {
        let (_, state) = state();
        let a = state.begin_refresh();
        let b = state.begin_refresh();
        assert!(b > a);
    }
}

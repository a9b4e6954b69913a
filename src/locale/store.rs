//! Atomically swappable trait table snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{refresh, LocaleResolver, LocaleTraitTable};
use crate::fetcher::PageFetcher;
use crate::{BingError, Result};

/// Holds the current [`LocaleTraitTable`] and replaces it wholesale.
///
/// Readers take an `Arc` snapshot and keep a consistent view for the whole
/// query even if a refresh lands meanwhile. A failed refresh keeps the old
/// table.
pub struct TraitStore {
    inner: ArcSwap<LocaleTraitTable>,
    refreshing: AtomicBool,
}

impl TraitStore {
    /// Creates a store with the given initial table.
    pub fn new(initial: LocaleTraitTable) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(initial)),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<LocaleTraitTable> {
        self.inner.load_full()
    }

    /// Swaps in a fully built table.
    pub fn replace(&self, table: LocaleTraitTable) {
        self.inner.store(Arc::new(table));
    }

    /// Rebuilds the table from the reference page. Only one refresh runs at
    /// a time; a concurrent call returns an error without fetching.
    pub async fn refresh(&self, fetcher: &dyn PageFetcher, url: &str) -> Result<()> {
        let Some(_guard) = RefreshGuard::acquire(&self.refreshing) else {
            info!("Trait table refresh already in progress, skipping");
            return Err(BingError::Other("trait refresh already in progress".into()));
        };

        match refresh(fetcher, url).await {
            Ok(table) => {
                self.replace(table);
                info!("Trait table refreshed");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to refresh trait table, keeping stale data");
                Err(e)
            }
        }
    }

    /// Spawns a background loop that refreshes the table on a timer.
    pub fn spawn_refresh_loop(
        self: &Arc<Self>,
        fetcher: Arc<dyn PageFetcher>,
        url: String,
        interval: Duration,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        info!(interval_secs = interval.as_secs(), "Trait refresh loop started");
        tokio::spawn(async move {
            loop {
                // Errors are already logged by refresh.
                let _ = store.refresh(fetcher.as_ref(), &url).await;
                tokio::time::sleep(interval).await;
            }
        })
    }
}

/// Holds the single-flight flag and clears it on drop, including when the
/// refresh future is cancelled mid-fetch.
struct RefreshGuard<'a>(&'a AtomicBool);

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for TraitStore {
    fn default() -> Self {
        Self::new(LocaleTraitTable::default())
    }
}

impl LocaleResolver for TraitStore {
    fn language(&self, tag: &str) -> Option<String> {
        self.inner.load().language(tag)
    }

    fn region(&self, tag: &str) -> Option<String> {
        self.inner.load().region(tag)
    }
}

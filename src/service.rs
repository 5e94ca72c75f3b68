//! The dashboard data layer handle.
//!
//! [`Dashboard`] bundles a [`Store`], the page view cache that mutations
//! revalidate, configuration and metrics. It is `Clone` (every part is behind
//! an `Arc` or is itself a cheap handle), so one instance can be shared by
//! every request handler.
//!
//! Queries live in [`crate::queries`], product mutations in [`crate::actions`].

use crate::backend::{CacheBackend, InMemoryBackend};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::observability::{LogMetrics, QueryMetrics};
use crate::pages::PageCache;
use crate::repository::Store;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Data access and aggregation layer over a [`Store`].
///
/// # Example
///
/// ```
/// use dashboard_kit::{Dashboard, FormData};
/// use dashboard_kit::store::InMemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dashboard = Dashboard::new(InMemoryStore::new());
///
/// let form = FormData::new().with("name", "Desk Lamp").with("price", "24.99");
/// assert!(dashboard.create_product(&form).await.is_success());
///
/// let products = dashboard.fetch_products().await.unwrap();
/// assert_eq!(products[0].price_formatted, "$24.99");
/// # }
/// ```
pub struct Dashboard<S: Store, B: CacheBackend = InMemoryBackend> {
    pub(crate) store: Arc<S>,
    pub(crate) pages: PageCache<B>,
    pub(crate) config: Arc<DashboardConfig>,
    pub(crate) metrics: Arc<dyn QueryMetrics>,
}

impl<S: Store, B: CacheBackend> Clone for Dashboard<S, B> {
    fn clone(&self) -> Self {
        Dashboard {
            store: Arc::clone(&self.store),
            pages: self.pages.clone(),
            config: Arc::clone(&self.config),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S: Store> Dashboard<S, InMemoryBackend> {
    /// Dashboard with an in-memory page cache and default settings.
    pub fn new(store: S) -> Self {
        Self::with_backend(store, InMemoryBackend::new())
    }
}

impl<S: Store, B: CacheBackend> Dashboard<S, B> {
    /// Dashboard whose page cache lives in `backend`.
    pub fn with_backend(store: S, backend: B) -> Self {
        Self::from_shared(Arc::new(store), backend)
    }

    /// Dashboard over an already shared store, e.g. one taken from a
    /// [`SharedStore`](crate::pool::SharedStore).
    pub fn from_shared(store: Arc<S>, backend: B) -> Self {
        let config = DashboardConfig::default();
        Dashboard {
            store,
            pages: PageCache::new(backend).with_ttl_policy(config.page_ttl.clone()),
            config: Arc::new(config),
            metrics: Arc::new(LogMetrics),
        }
    }

    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.pages = PageCache::new(self.pages.backend().clone())
            .with_ttl_policy(config.page_ttl.clone());
        self.config = Arc::new(config);
        self
    }

    pub fn with_metrics(mut self, metrics: impl QueryMetrics + 'static) -> Self {
        self.metrics = Arc::new(metrics);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The page view cache. Hosts may cache rendered views here; mutations
    /// revalidate it.
    pub fn pages(&self) -> &PageCache<B> {
        &self.pages
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run `work`, reporting its duration or its error under `operation`.
    pub(crate) async fn observe<T, Fut>(&self, operation: &'static str, work: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let outcome = work.await;
        match &outcome {
            Ok(_) => self.metrics.record_query(operation, start.elapsed()),
            Err(e) => self.metrics.record_error(operation, &e.to_string()),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::observability::TtlPolicy;
    use crate::store::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct CountingMetrics {
        queries: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
    }

    impl QueryMetrics for CountingMetrics {
        fn record_query(&self, _operation: &str, _duration: Duration) {
            self.queries.fetch_add(1, Ordering::SeqCst);
        }

        fn record_error(&self, _operation: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_observe_records_outcomes() {
        let metrics = CountingMetrics::default();
        let dashboard = Dashboard::new(InMemoryStore::new()).with_metrics(metrics.clone());

        let ok = dashboard.observe("ok", async { Ok(1) }).await;
        let failed: Result<()> = dashboard
            .observe("failed", async { Err(Error::StoreError("down".to_string())) })
            .await;

        assert_eq!(ok.unwrap(), 1);
        assert!(failed.is_err());
        assert_eq!(metrics.queries.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clones_share_store_and_pages() {
        let dashboard = Dashboard::new(InMemoryStore::new());
        let other = dashboard.clone();

        assert!(Arc::ptr_eq(&dashboard.store, &other.store));
        dashboard
            .pages()
            .backend()
            .set("/dashboard", b"v".to_vec(), None)
            .await
            .unwrap();
        assert!(other.pages().backend().contains("/dashboard"));
    }

    #[test]
    fn test_with_config_replaces_settings() {
        let dashboard = Dashboard::new(InMemoryStore::new()).with_config(
            DashboardConfig::default()
                .with_latest_invoices(3)
                .with_page_ttl(TtlPolicy::Infinite),
        );
        assert_eq!(dashboard.config().latest_invoices, 3);
    }
}

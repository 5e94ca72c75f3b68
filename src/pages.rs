//! Page view cache and path revalidation.
//!
//! Hosts cache rendered page data under the page's route path. After a
//! product mutation the [`Dashboard`](crate::Dashboard) revalidates
//! [`PRODUCTS_PATH`], dropping it and every page nested under it, so the next
//! request reloads from the store.
//!
//! Cache trouble is never fatal: a backend error or an undecodable entry is
//! logged and the view is loaded from the store as if it had not been cached.

use crate::backend::CacheBackend;
use crate::error::Result;
use crate::observability::TtlPolicy;
use crate::serialization::{decode_view, encode_view};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

/// Path of the product listing page. Revalidated after every mutation.
pub const PRODUCTS_PATH: &str = "/dashboard/products";

/// Path of the dashboard overview page.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Read-through cache of serialized page views.
#[derive(Clone)]
pub struct PageCache<B: CacheBackend> {
    backend: B,
    ttl_policy: TtlPolicy,
}

impl<B: CacheBackend> PageCache<B> {
    pub fn new(backend: B) -> Self {
        PageCache {
            backend,
            ttl_policy: TtlPolicy::default(),
        }
    }

    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Return the cached view for `path`, or run `loader` and cache its result.
    ///
    /// Loader errors are returned untouched and nothing is cached.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let products = dashboard
    ///     .pages()
    ///     .load(PRODUCTS_PATH, || dashboard.fetch_products())
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Only the loader's own errors.
    pub async fn load<T, E, F, Fut>(&self, path: &str, loader: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        match self.backend.get(path).await {
            Ok(Some(bytes)) => match decode_view::<T>(&bytes) {
                Ok(view) => {
                    debug!("✓ Page cache hit for {}", path);
                    return Ok(view);
                }
                Err(e) => {
                    warn!("Evicting unreadable cached view {}: {}", path, e);
                    if let Err(e) = self.backend.delete(path).await {
                        warn!("Failed to evict {}: {}", path, e);
                    }
                }
            },
            Ok(None) => debug!("Page cache miss for {}", path),
            Err(e) => warn!("Page cache unavailable for {}: {}", path, e),
        }

        let view = loader().await?;

        match encode_view(&view) {
            Ok(bytes) => {
                let ttl = self.ttl_policy.get_ttl(path);
                if let Err(e) = self.backend.set(path, bytes, ttl).await {
                    warn!("Failed to cache view {}: {}", path, e);
                }
            }
            Err(e) => warn!("Failed to encode view {}: {}", path, e),
        }

        Ok(view)
    }

    /// Mark `path` and every page beneath it stale.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend cannot delete.
    pub async fn revalidate_path(&self, path: &str) -> Result<usize> {
        let dropped = self.backend.delete_prefix(path).await?;
        debug!("Revalidated {} ({} cached views dropped)", path, dropped);
        Ok(dropped)
    }
}

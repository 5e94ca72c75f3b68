//! Storage for cached page views.
//!
//! Pages rendered from dashboard data are cached under their route path
//! (`/dashboard/products`, `/dashboard/products/7/edit`). A mutation makes
//! those entries stale; [`CacheBackend::delete_prefix`] drops a path and
//! everything beneath it in one call.

use crate::error::Result;
use std::time::Duration;

pub mod inmemory;

pub use inmemory::InMemoryBackend;

/// Trait for page cache backends.
///
/// All methods take `&self`; implementations use interior mutability.
#[allow(async_fn_in_trait)]
pub trait CacheBackend: Send + Sync + Clone {
    /// Retrieve a cached view.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - cached and not expired
    /// - `Ok(None)` - not cached
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Store a view with optional TTL. `None` means no expiry.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn set(&self, path: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Remove a single path.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn delete(&self, path: &str) -> Result<()>;

    /// Remove `path` and every path nested under it (`path/...`).
    /// Returns how many entries were dropped.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn delete_prefix(&self, path: &str) -> Result<usize>;

    /// Drop every cached view.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn clear_all(&self) -> Result<()>;
}

/// Whether `key` is `path` itself or nested below it.
///
/// `/dashboard/products` covers `/dashboard/products/3/edit` but not
/// `/dashboard/products-archive`.
pub fn is_under(key: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    match key.strip_prefix(path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_under() {
        assert!(is_under("/dashboard/products", "/dashboard/products"));
        assert!(is_under("/dashboard/products/3/edit", "/dashboard/products"));
        assert!(is_under("/dashboard/products?query=lamp", "/dashboard/products/"));
        assert!(!is_under("/dashboard/products-archive", "/dashboard/products"));
        assert!(!is_under("/dashboard", "/dashboard/products"));
    }
}

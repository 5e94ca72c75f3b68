//! In-memory page cache backend (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-key sharding.
//! Expired entries are dropped when read.

use super::{is_under, CacheBackend};
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        CacheEntry { data, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// Thread-safe in-memory page cache.
///
/// Clones share the same map.
///
/// ```no_run
/// use dashboard_kit::backend::{CacheBackend, InMemoryBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///     backend.set("/dashboard/products", b"view".to_vec(), None).await?;
///     backend.delete_prefix("/dashboard/products").await?;
///     assert!(backend.get("/dashboard/products").await?.is_none());
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, CacheEntry>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Whether a live entry exists for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.store
            .get(path)
            .is_some_and(|entry| !entry.is_expired())
    }
}

impl CacheBackend for InMemoryBackend {
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.store.get(path) {
            if !entry.is_expired() {
                debug!("✓ InMemory GET {} -> HIT", path);
                return Ok(Some(entry.data.clone()));
            }
        }

        self.store.remove(path);
        debug!("✓ InMemory GET {} -> MISS", path);
        Ok(None)
    }

    async fn set(&self, path: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.store
            .insert(path.to_string(), CacheEntry::new(value, ttl));
        debug!("✓ InMemory SET {} (TTL: {:?})", path, ttl);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.store.remove(path);
        debug!("✓ InMemory DELETE {}", path);
        Ok(())
    }

    async fn delete_prefix(&self, path: &str) -> Result<usize> {
        let before = self.store.len();
        self.store.retain(|key, _| !is_under(key, path));
        let dropped = before.saturating_sub(self.store.len());
        debug!("✓ InMemory DELETE {}/* ({} entries)", path, dropped);
        Ok(dropped)
    }

    async fn clear_all(&self) -> Result<()> {
        self.store.clear();
        warn!("⚠ InMemory CLEAR_ALL executed - all cached views dropped");
        Ok(())
    }
}

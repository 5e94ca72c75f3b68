//! Process-wide store handle.
//!
//! Opening a connection pool per request exhausts the database under load, so
//! each process keeps exactly one store. [`SharedStore`] is the cell that holds
//! it: declare it as a `static`, and every caller gets the same `Arc`.
//!
//! Construction is guarded by an async once-cell: when many tasks race on first
//! use, one runs the initializer and the others wait for its result. A failed
//! initialization stores nothing, so the next caller retries.
//!
//! ```
//! use dashboard_kit::pool::SharedStore;
//! use dashboard_kit::store::InMemoryStore;
//!
//! static STORE: SharedStore<InMemoryStore> = SharedStore::new();
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dashboard_kit::Result<()> {
//! let a = STORE.get_or_try_init(|| async { Ok(InMemoryStore::new()) }).await?;
//! let b = STORE.get_or_try_init(|| async { Ok(InMemoryStore::new()) }).await?;
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily initialized, shared store handle.
pub struct SharedStore<S> {
    cell: OnceCell<Arc<S>>,
}

impl<S> SharedStore<S> {
    /// Empty handle, usable in a `static`.
    pub const fn new() -> Self {
        SharedStore {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the store, running `init` if this is the first successful call.
    ///
    /// # Errors
    ///
    /// Returns whatever `init` returned. The cell stays empty in that case.
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<Arc<S>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S>>,
    {
        self.cell
            .get_or_try_init(|| async move {
                let store = init().await?;
                info!("Shared store initialized");
                Ok::<_, Error>(Arc::new(store))
            })
            .await
            .map(Arc::clone)
    }

    /// The store, if already initialized.
    pub fn get(&self) -> Option<Arc<S>> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<S> Default for SharedStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

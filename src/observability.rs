//! Query metrics and cached-view lifetimes.
//!
//! # Metrics
//!
//! Every public [`Dashboard`](crate::Dashboard) operation reports to a
//! [`QueryMetrics`] implementation under its operation name
//! (`"fetch_card_data"`, `"create_product"`, ...). The default methods log via
//! the `log` crate; [`NoOpMetrics`] discards everything.
//!
//! ```ignore
//! use dashboard_kit::observability::QueryMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl QueryMetrics for PrometheusMetrics {
//!     fn record_query(&self, operation: &str, duration: Duration) {
//!         // histogram!("dashboard_query_seconds", "op" => operation).record(duration);
//!     }
//! }
//! ```
//!
//! # TTL Policies
//!
//! | Policy | Use Case |
//! |--------|----------|
//! | `Default` | Let the backend decide |
//! | `Fixed` | Every page view expires after the same duration |
//! | `Infinite` | Views live until revalidated |
//! | `PerPath` | Different lifetimes per page |

use std::time::Duration;

/// Trait for query metrics collection.
pub trait QueryMetrics: Send + Sync {
    /// Record a successful operation.
    fn record_query(&self, operation: &str, duration: Duration) {
        debug!("Query {} took {:?}", operation, duration);
    }

    /// Record a failed operation. `error` is the internal detail.
    fn record_error(&self, operation: &str, error: &str) {
        warn!("Query {} failed: {}", operation, error);
    }

    /// Record a path revalidation.
    fn record_revalidation(&self, path: &str) {
        debug!("Revalidated {}", path);
    }
}

/// Metrics sink that discards everything.
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl QueryMetrics for NoOpMetrics {
    fn record_query(&self, _operation: &str, _duration: Duration) {}
    fn record_error(&self, _operation: &str, _error: &str) {}
    fn record_revalidation(&self, _path: &str) {}
}

/// Metrics sink that only logs (the trait defaults).
#[derive(Clone, Default)]
pub struct LogMetrics;

impl QueryMetrics for LogMetrics {}

/// Lifetime policy for cached page views.
#[derive(Clone, Debug, Default)]
pub enum TtlPolicy {
    /// Use backend's default TTL
    #[default]
    Default,

    /// Fixed duration for all views
    Fixed(Duration),

    /// No TTL (views live until revalidated)
    Infinite,

    /// Custom per-path policy
    PerPath(fn(&str) -> Duration),
}

impl TtlPolicy {
    /// Get TTL for a page path.
    pub fn get_ttl(&self, path: &str) -> Option<Duration> {
        match self {
            TtlPolicy::Default => None,
            TtlPolicy::Fixed(d) => Some(*d),
            TtlPolicy::Infinite => None,
            TtlPolicy::PerPath(f) => Some(f(path)),
        }
    }
}

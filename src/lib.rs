//! # dashboard-kit
//!
//! Data access and aggregation layer for a commerce admin dashboard.
//!
//! ## Features
//!
//! - **Store Agnostic:** Works against four repository traits; ships an
//!   in-memory store and a PostgreSQL store (feature `postgres`)
//! - **Aggregates:** Summary cards, latest invoices, product statistics,
//!   revenue and top products, computed live on every call
//! - **Safe Boundary:** Every operation returns a value; store faults are logged
//!   and replaced by a generic message before reaching the caller
//! - **Consistent Money:** Every amount passes through one [`CurrencyFormat`]
//! - **Page Revalidation:** Product mutations drop cached views under
//!   `/dashboard/products`
//!
//! ## Quick Start
//!
//! ```
//! use dashboard_kit::{Dashboard, FormData};
//! use dashboard_kit::store::InMemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // 1. Build a dashboard over a store (Clone it into each handler)
//! let dashboard = Dashboard::new(InMemoryStore::new());
//!
//! // 2. Mutations take untyped form fields and return an ActionResult
//! let form = FormData::new()
//!     .with("name", "Desk Lamp")
//!     .with("price", "24.99");
//! let result = dashboard.create_product(&form).await;
//! assert!(result.is_success());
//!
//! // 3. Queries return presentation records or a DashboardError
//! let stats = dashboard.product_stats().await.unwrap();
//! assert_eq!(stats.total_products, 1);
//! assert_eq!(stats.avg_price_formatted, "$24.99");
//! # }
//! ```
//!
//! ### With PostgreSQL
//!
//! ```ignore
//! use dashboard_kit::{config::DatabaseConfig, store::PgStore, Dashboard};
//! use dashboard_kit::backend::InMemoryBackend;
//!
//! // One pool per process, however many tasks race to create it
//! let store = PgStore::shared(&DatabaseConfig::from_env()?).await?;
//! let dashboard = Dashboard::from_shared(store, InMemoryBackend::new());
//! let cards = dashboard.fetch_card_data().await?;
//! ```

#[macro_use]
extern crate log;

pub mod actions;
pub mod backend;
pub mod config;
pub mod entity;
pub mod error;
pub mod format;
pub mod input;
pub mod observability;
pub mod pages;
pub mod pool;
pub mod queries;
pub mod repository;
pub mod serialization;
pub mod service;
pub mod store;
pub mod views;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use config::DashboardConfig;
pub use entity::{ProductId, RawId};
pub use error::{DashboardError, DashboardResult, Error, ErrorKind, Result};
pub use format::{format_currency, CurrencyFormat};
pub use input::{FormData, ProductInput, ValidationError};
pub use repository::{DataRepository, Store};
pub use service::Dashboard;
pub use views::ActionResult;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Repository traits: the store boundary.
//!
//! The data layer never talks to a database client directly. It sees four
//! collections through these traits, which any relational or document store
//! with secondary indexes can implement:
//!
//! - [`ProductRepository`]: the only collection this layer writes to
//! - [`InvoiceRepository`]: latest-by-date listing and grouped sums
//! - [`CustomerRepository`]: point and batch lookups
//! - [`RevenueRepository`]: the revenue time series
//!
//! [`Store`] bundles the four so a [`Dashboard`](crate::Dashboard) can be
//! generic over a single type parameter.
//!
//! # Error Handling
//!
//! Implementations return `Err` for store faults only. A missing record is
//! `Ok(None)` (lookups) or `Ok(false)` (deletes), never an error: the caller
//! decides what absence means.

use crate::entity::{
    Customer, Invoice, Product, ProductId, Revenue, StatusTotal, StoreEntity,
};
use crate::error::{Error, Result};
use crate::input::ProductInput;
use futures::future::try_join_all;

/// Read access shared by every collection.
#[allow(async_fn_in_trait)]
pub trait DataRepository<T: StoreEntity>: Send + Sync {
    /// Fetch one record by id.
    ///
    /// # Returns
    /// - `Ok(Some(record))` - found
    /// - `Ok(None)` - no such record (not an error)
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable or the query fails
    async fn fetch_by_id(&self, id: &T::Key) -> Result<Option<T>>;

    /// Fetch many records by id, positionally aligned with `ids`.
    ///
    /// Default implementation issues the point lookups concurrently.
    /// Override for a single round trip (e.g. SQL `WHERE id = ANY($1)`).
    ///
    /// # Errors
    /// Returns `Err` if any lookup fails
    async fn fetch_by_ids(&self, ids: &[T::Key]) -> Result<Vec<Option<T>>> {
        try_join_all(ids.iter().map(|id| self.fetch_by_id(id))).await
    }

    /// Count records in the collection.
    ///
    /// # Errors
    /// Returns `Err` if not implemented or if the query fails
    async fn count(&self) -> Result<u64> {
        Err(Error::Other(format!(
            "count not implemented for {}",
            T::collection()
        )))
    }

    /// Fetch the whole collection, in the collection's natural order.
    ///
    /// # Errors
    /// Returns `Err` if not implemented or if the query fails
    async fn fetch_all(&self) -> Result<Vec<T>> {
        Err(Error::Other(format!(
            "fetch_all not implemented for {}",
            T::collection()
        )))
    }
}

/// Ordering for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductOrder {
    /// Highest id first. Ids grow with insertion, so this is newest first.
    #[default]
    IdDesc,
    /// Name ascending.
    NameAsc,
    /// Highest price first, lowest id breaking ties.
    PriceDesc,
}

/// Product collection: reads, writes and aggregates.
#[allow(async_fn_in_trait)]
pub trait ProductRepository: DataRepository<Product> {
    /// Insert a product and return it with its assigned id.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn create(&self, input: &ProductInput) -> Result<Product>;

    /// Replace name, price and image of product `id`.
    ///
    /// Returns `Ok(None)` when no product has that id.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Option<Product>>;

    /// Physically delete product `id`. Returns whether a record was removed.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn delete(&self, id: ProductId) -> Result<bool>;

    /// List products, optionally limited.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn list(&self, order: ProductOrder, limit: Option<usize>) -> Result<Vec<Product>>;

    /// Products whose name contains `query`, ignoring case, by name ascending.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn search(&self, query: &str) -> Result<Vec<Product>>;

    /// Average price, `None` for an empty collection.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn average_price(&self) -> Result<Option<f64>>;

    /// The most expensive product, lowest id on ties.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn highest_priced(&self) -> Result<Option<Product>> {
        Ok(self
            .list(ProductOrder::PriceDesc, Some(1))
            .await?
            .into_iter()
            .next())
    }
}

/// Invoice collection.
#[allow(async_fn_in_trait)]
pub trait InvoiceRepository: DataRepository<Invoice> {
    /// The `limit` most recent invoices by date, newest first.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn latest(&self, limit: usize) -> Result<Vec<Invoice>>;

    /// Sum of amounts grouped by status. Statuses with no invoices are absent.
    ///
    /// # Errors
    /// Returns `Err` on store failure
    async fn sum_by_status(&self) -> Result<Vec<StatusTotal>>;
}

/// Customer collection. Point and batch lookups come from [`DataRepository`].
pub trait CustomerRepository: DataRepository<Customer> {}

/// Revenue time series.
pub trait RevenueRepository: DataRepository<Revenue> {}

/// A store exposing all four collections.
pub trait Store: Send + Sync {
    type Products: ProductRepository;
    type Invoices: InvoiceRepository;
    type Customers: CustomerRepository;
    type Revenue: RevenueRepository;

    fn products(&self) -> &Self::Products;
    fn invoices(&self) -> &Self::Invoices;
    fn customers(&self) -> &Self::Customers;
    fn revenue(&self) -> &Self::Revenue;
}

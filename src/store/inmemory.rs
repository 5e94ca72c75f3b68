//! In-memory store (thread-safe, async).
//!
//! Uses DashMap per collection for concurrent access without async locks.
//! Intended for tests and local development: data lives as long as the
//! process. Each collection can be switched "unavailable" to simulate a
//! store outage.

use crate::entity::{
    Customer, Invoice, InvoiceStatus, Product, ProductId, Revenue, StatusTotal,
};
use crate::error::{Error, Result};
use crate::input::ProductInput;
use crate::repository::{
    CustomerRepository, DataRepository, InvoiceRepository, ProductOrder, ProductRepository,
    RevenueRepository, Store,
};
use dashmap::DashMap;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

/// Outage switch shared by a collection and its clones.
#[derive(Clone, Default)]
struct Availability {
    down: Arc<AtomicBool>,
}

impl Availability {
    fn set_unavailable(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self, collection: &str, op: &str) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            warn!("⚠ InMemory {} unavailable, failing {}", collection, op);
            return Err(Error::StoreError(format!(
                "{} unavailable during {}",
                collection, op
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Clone)]
pub struct InMemoryProducts {
    rows: Arc<DashMap<ProductId, Product>>,
    next_id: Arc<AtomicI64>,
    availability: Availability,
}

impl Default for InMemoryProducts {
    fn default() -> Self {
        InMemoryProducts {
            rows: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
            availability: Availability::default(),
        }
    }
}

impl InMemoryProducts {
    /// Seed a product with an explicit id. Later creates get higher ids.
    pub fn insert(&self, product: Product) {
        self.next_id
            .fetch_max(product.id.0.saturating_add(1), Ordering::SeqCst);
        self.rows.insert(product.id, product);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn set_unavailable(&self, down: bool) {
        self.availability.set_unavailable(down);
    }

    fn snapshot(&self) -> Vec<Product> {
        self.rows.iter().map(|entry| entry.value().clone()).collect()
    }
}

fn compare_products(order: ProductOrder, a: &Product, b: &Product) -> CmpOrdering {
    match order {
        ProductOrder::IdDesc => b.id.cmp(&a.id),
        ProductOrder::NameAsc => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
            .then(a.id.cmp(&b.id)),
        ProductOrder::PriceDesc => b
            .price
            .total_cmp(&a.price)
            .then(a.id.cmp(&b.id)),
    }
}

impl DataRepository<Product> for InMemoryProducts {
    async fn fetch_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        self.availability.check("products", "fetch_by_id")?;
        let found = self.rows.get(id).map(|entry| entry.value().clone());
        debug!(
            "✓ InMemory GET products/{} -> {}",
            id,
            if found.is_some() { "HIT" } else { "MISS" }
        );
        Ok(found)
    }

    async fn count(&self) -> Result<u64> {
        self.availability.check("products", "count")?;
        Ok(self.rows.len() as u64)
    }

    async fn fetch_all(&self) -> Result<Vec<Product>> {
        self.list(ProductOrder::IdDesc, None).await
    }
}

impl ProductRepository for InMemoryProducts {
    async fn create(&self, input: &ProductInput) -> Result<Product> {
        self.availability.check("products", "create")?;
        let id = ProductId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let product = Product {
            id,
            name: input.name.clone(),
            price: input.price,
            image_url: input.image_url.clone(),
        };
        self.rows.insert(id, product.clone());
        debug!("✓ InMemory INSERT products/{}", id);
        Ok(product)
    }

    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Option<Product>> {
        self.availability.check("products", "update")?;
        let updated = self.rows.get_mut(&id).map(|mut entry| {
            let product = entry.value_mut();
            product.name = input.name.clone();
            product.price = input.price;
            product.image_url = input.image_url.clone();
            product.clone()
        });
        debug!("✓ InMemory UPDATE products/{} -> {}", id, updated.is_some());
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        self.availability.check("products", "delete")?;
        let removed = self.rows.remove(&id).is_some();
        debug!("✓ InMemory DELETE products/{} -> {}", id, removed);
        Ok(removed)
    }

    async fn list(&self, order: ProductOrder, limit: Option<usize>) -> Result<Vec<Product>> {
        self.availability.check("products", "list")?;
        let mut products = self.snapshot();
        products.sort_by(|a, b| compare_products(order, a, b));
        if let Some(limit) = limit {
            products.truncate(limit);
        }
        Ok(products)
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>> {
        self.availability.check("products", "search")?;
        let needle = query.to_lowercase();
        let mut matches: Vec<Product> = self
            .rows
            .iter()
            .filter(|entry| entry.value().name.to_lowercase().contains(&needle))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| compare_products(ProductOrder::NameAsc, a, b));
        Ok(matches)
    }

    async fn average_price(&self) -> Result<Option<f64>> {
        self.availability.check("products", "average_price")?;
        let (sum, count) = self
            .rows
            .iter()
            .fold((0.0, 0usize), |(sum, count), entry| {
                (sum + entry.value().price, count + 1)
            });
        Ok((count > 0).then(|| sum / count as f64))
    }
}

// ============================================================================
// Invoices
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryInvoices {
    rows: Arc<DashMap<String, Invoice>>,
    availability: Availability,
}

impl InMemoryInvoices {
    pub fn insert(&self, invoice: Invoice) {
        self.rows.insert(invoice.id.clone(), invoice);
    }

    pub fn set_unavailable(&self, down: bool) {
        self.availability.set_unavailable(down);
    }
}

impl DataRepository<Invoice> for InMemoryInvoices {
    async fn fetch_by_id(&self, id: &String) -> Result<Option<Invoice>> {
        self.availability.check("invoices", "fetch_by_id")?;
        Ok(self.rows.get(id).map(|entry| entry.value().clone()))
    }

    async fn count(&self) -> Result<u64> {
        self.availability.check("invoices", "count")?;
        Ok(self.rows.len() as u64)
    }

    async fn fetch_all(&self) -> Result<Vec<Invoice>> {
        self.latest(usize::MAX).await
    }
}

impl InvoiceRepository for InMemoryInvoices {
    async fn latest(&self, limit: usize) -> Result<Vec<Invoice>> {
        self.availability.check("invoices", "latest")?;
        let mut invoices: Vec<Invoice> =
            self.rows.iter().map(|entry| entry.value().clone()).collect();
        invoices.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        invoices.truncate(limit);
        Ok(invoices)
    }

    async fn sum_by_status(&self) -> Result<Vec<StatusTotal>> {
        self.availability.check("invoices", "sum_by_status")?;
        let mut totals: Vec<StatusTotal> = Vec::new();
        for entry in self.rows.iter() {
            let invoice = entry.value();
            if invoice.status == InvoiceStatus::Unknown {
                warn!("Skipping invoice {} with unknown status", invoice.id);
                continue;
            }
            match totals.iter_mut().find(|t| t.status == invoice.status) {
                Some(total) => total.total += invoice.amount,
                None => totals.push(StatusTotal {
                    status: invoice.status,
                    total: invoice.amount,
                }),
            }
        }
        totals.sort_by_key(|t| status_rank(t.status));
        Ok(totals)
    }
}

fn status_rank(status: InvoiceStatus) -> u8 {
    match status {
        InvoiceStatus::Paid => 0,
        InvoiceStatus::Pending => 1,
        InvoiceStatus::Overdue => 2,
        InvoiceStatus::Unknown => 3,
    }
}

// ============================================================================
// Customers
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryCustomers {
    rows: Arc<DashMap<String, Customer>>,
    availability: Availability,
}

impl InMemoryCustomers {
    pub fn insert(&self, customer: Customer) {
        self.rows.insert(customer.id.clone(), customer);
    }

    /// Remove a customer, leaving any invoices that reference it orphaned.
    pub fn remove(&self, id: &str) -> Option<Customer> {
        self.rows.remove(id).map(|(_, customer)| customer)
    }

    pub fn set_unavailable(&self, down: bool) {
        self.availability.set_unavailable(down);
    }
}

impl DataRepository<Customer> for InMemoryCustomers {
    async fn fetch_by_id(&self, id: &String) -> Result<Option<Customer>> {
        self.availability.check("customers", "fetch_by_id")?;
        Ok(self.rows.get(id).map(|entry| entry.value().clone()))
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Option<Customer>>> {
        self.availability.check("customers", "fetch_by_ids")?;
        debug!("✓ InMemory MGET customers ({} ids)", ids.len());
        Ok(ids
            .iter()
            .map(|id| self.rows.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        self.availability.check("customers", "count")?;
        Ok(self.rows.len() as u64)
    }
}

impl CustomerRepository for InMemoryCustomers {}

// ============================================================================
// Revenue
// ============================================================================

/// Revenue rows in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryRevenue {
    rows: Arc<RwLock<Vec<Revenue>>>,
    availability: Availability,
}

impl InMemoryRevenue {
    /// Append a row, replacing any existing row for the same month in place.
    pub fn insert(&self, row: Revenue) -> Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| Error::StoreError(format!("revenue lock poisoned: {}", e)))?;
        match rows.iter_mut().find(|r| r.month == row.month) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }

    pub fn set_unavailable(&self, down: bool) {
        self.availability.set_unavailable(down);
    }

    fn read(&self) -> Result<Vec<Revenue>> {
        self.rows
            .read()
            .map(|rows| rows.clone())
            .map_err(|e| Error::StoreError(format!("revenue lock poisoned: {}", e)))
    }
}

impl DataRepository<Revenue> for InMemoryRevenue {
    async fn fetch_by_id(&self, month: &String) -> Result<Option<Revenue>> {
        self.availability.check("revenue", "fetch_by_id")?;
        Ok(self.read()?.into_iter().find(|r| &r.month == month))
    }

    async fn count(&self) -> Result<u64> {
        self.availability.check("revenue", "count")?;
        Ok(self.read()?.len() as u64)
    }

    async fn fetch_all(&self) -> Result<Vec<Revenue>> {
        self.availability.check("revenue", "fetch_all")?;
        self.read()
    }
}

impl RevenueRepository for InMemoryRevenue {}

// ============================================================================
// Store
// ============================================================================

/// All four collections in memory.
///
/// Clones share the same data. Seeding and outage switches are inherent
/// methods on the collection types, reached through [`Store`] accessors.
///
/// # Example
///
/// ```
/// use dashboard_kit::entity::{Product, ProductId};
/// use dashboard_kit::repository::Store;
/// use dashboard_kit::store::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// store.products().insert(Product {
///     id: ProductId(1),
///     name: "Desk Lamp".to_string(),
///     price: 24.99,
///     image_url: String::new(),
/// });
/// assert_eq!(store.products().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: InMemoryProducts,
    invoices: InMemoryInvoices,
    customers: InMemoryCustomers,
    revenue: InMemoryRevenue,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    type Products = InMemoryProducts;
    type Invoices = InMemoryInvoices;
    type Customers = InMemoryCustomers;
    type Revenue = InMemoryRevenue;

    fn products(&self) -> &Self::Products {
        &self.products
    }

    fn invoices(&self) -> &Self::Invoices {
        &self.invoices
    }

    fn customers(&self) -> &Self::Customers {
        &self.customers
    }

    fn revenue(&self) -> &Self::Revenue {
        &self.revenue
    }
}

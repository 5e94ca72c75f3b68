//! PostgreSQL store (requires the `postgres` feature).
//!
//! Maps the dashboard schema onto the repository traits with SQLx:
//!
//! ```text
//! products  (id_product, nama_produk, harga, image_url)
//! invoices  (id, customer_id, amount, status, date)
//! customers (id, name, email, image_url)
//! revenue   (month, revenue)
//! ```
//!
//! `invoices.customer_id` has no foreign key; customers are resolved by
//! [`DataRepository::fetch_by_ids`] in one `= ANY($1)` round trip.
//!
//! Use [`PgStore::shared`] to get the process-wide instance so every caller
//! draws from the same connection pool.

use crate::config::DatabaseConfig;
use crate::entity::{
    Customer, Invoice, InvoiceStatus, Product, ProductId, Revenue, StatusTotal,
};
use crate::error::Result;
use crate::input::ProductInput;
use crate::pool::SharedStore;
use crate::repository::{
    CustomerRepository, DataRepository, InvoiceRepository, ProductOrder, ProductRepository,
    RevenueRepository, Store,
};
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::collections::HashMap;
use std::sync::Arc;

static SHARED: SharedStore<PgStore> = SharedStore::new();

const PRODUCT_COLUMNS: &str =
    "id_product::int8 AS id, nama_produk AS name, harga::float8 AS price, image_url";
const INVOICE_COLUMNS: &str = "id::text AS id, customer_id::text AS customer_id, \
     amount::float8 AS amount, status, date::date AS date";
const CUSTOMER_COLUMNS: &str = "id::text AS id, name, email, image_url";

#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: f64,
    image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId(row.id),
            name: row.name,
            price: row.price,
            image_url: row.image_url.unwrap_or_default(),
        }
    }
}

#[derive(FromRow)]
struct InvoiceRow {
    id: String,
    customer_id: String,
    amount: f64,
    status: String,
    date: NaiveDate,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|_| {
            warn!("Invoice {} has unknown status {:?}", row.id, row.status);
            InvoiceStatus::Unknown
        });
        Invoice {
            id: row.id,
            customer_id: row.customer_id,
            amount: row.amount,
            status,
            date: row.date,
        }
    }
}

/// Turn `(status, total)` rows into totals, dropping statuses outside the
/// known set.
fn status_totals(rows: Vec<(String, f64)>) -> Vec<StatusTotal> {
    rows.into_iter()
        .filter_map(|(status, total)| match status.parse() {
            Ok(status) => Some(StatusTotal { status, total }),
            Err(_) => {
                warn!("Skipping invoices with unknown status {:?}", status);
                None
            }
        })
        .collect()
}

#[derive(FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    email: String,
    image_url: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            image_url: row.image_url.unwrap_or_default(),
        }
    }
}

/// Escape `%`, `_` and `\` so user text matches literally inside `ILIKE`.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ============================================================================
// Products
// ============================================================================

#[derive(Clone)]
pub struct PgProducts {
    pool: PgPool,
}

impl DataRepository<Product> for PgProducts {
    async fn fetch_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id_product = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_all(&self) -> Result<Vec<Product>> {
        self.list(ProductOrder::IdDesc, None).await
    }
}

impl ProductRepository for PgProducts {
    async fn create(&self, input: &ProductInput) -> Result<Product> {
        let sql = format!(
            "INSERT INTO products (nama_produk, harga, image_url) VALUES ($1, $2, $3) RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Option<Product>> {
        let sql = format!(
            "UPDATE products SET nama_produk = $2, harga = $3, image_url = $4 \
             WHERE id_product = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.0)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.image_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id_product = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list(&self, order: ProductOrder, limit: Option<usize>) -> Result<Vec<Product>> {
        let order_by = match order {
            ProductOrder::IdDesc => "id_product DESC",
            ProductOrder::NameAsc => "LOWER(nama_produk) ASC, nama_produk ASC, id_product ASC",
            ProductOrder::PriceDesc => "harga DESC, id_product ASC",
        };
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT {} FROM products ORDER BY {} LIMIT $1",
            PRODUCT_COLUMNS, order_by
        );
        // LIMIT NULL means no limit
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE nama_produk ILIKE '%' || $1 || '%' \
             ORDER BY LOWER(nama_produk) ASC, nama_produk ASC, id_product ASC",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(escape_like(query))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn average_price(&self) -> Result<Option<f64>> {
        let avg = sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(harga)::float8 FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }
}

// ============================================================================
// Invoices
// ============================================================================

#[derive(Clone)]
pub struct PgInvoices {
    pool: PgPool,
}

impl DataRepository<Invoice> for PgInvoices {
    async fn fetch_by_id(&self, id: &String) -> Result<Option<Invoice>> {
        let sql = format!("SELECT {} FROM invoices WHERE id::text = $1", INVOICE_COLUMNS);
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Invoice::from))
    }

    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

impl InvoiceRepository for PgInvoices {
    async fn latest(&self, limit: usize) -> Result<Vec<Invoice>> {
        let sql = format!(
            "SELECT {} FROM invoices ORDER BY date DESC, id ASC LIMIT $1",
            INVOICE_COLUMNS
        );
        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    async fn sum_by_status(&self) -> Result<Vec<StatusTotal>> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            "SELECT status, COALESCE(SUM(amount), 0)::float8 FROM invoices GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(status_totals(rows))
    }
}

// ============================================================================
// Customers
// ============================================================================

#[derive(Clone)]
pub struct PgCustomers {
    pool: PgPool,
}

impl DataRepository<Customer> for PgCustomers {
    async fn fetch_by_id(&self, id: &String) -> Result<Option<Customer>> {
        let sql = format!("SELECT {} FROM customers WHERE id::text = $1", CUSTOMER_COLUMNS);
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Customer::from))
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Option<Customer>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM customers WHERE id::text = ANY($1)",
            CUSTOMER_COLUMNS
        );
        let rows = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        let by_id: HashMap<String, Customer> = rows
            .into_iter()
            .map(|row| (row.id.clone(), Customer::from(row)))
            .collect();
        Ok(ids.iter().map(|id| by_id.get(id).cloned()).collect())
    }

    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

impl CustomerRepository for PgCustomers {}

// ============================================================================
// Revenue
// ============================================================================

#[derive(Clone)]
pub struct PgRevenue {
    pool: PgPool,
}

impl DataRepository<Revenue> for PgRevenue {
    async fn fetch_by_id(&self, month: &String) -> Result<Option<Revenue>> {
        let row = sqlx::query_as::<_, (String, f64)>(
            "SELECT month, revenue::float8 FROM revenue WHERE month = $1",
        )
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(month, revenue)| Revenue { month, revenue }))
    }

    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM revenue")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_all(&self) -> Result<Vec<Revenue>> {
        let rows = sqlx::query_as::<_, (String, f64)>("SELECT month, revenue::float8 FROM revenue")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(month, revenue)| Revenue { month, revenue })
            .collect())
    }
}

impl RevenueRepository for PgRevenue {}

// ============================================================================
// Store
// ============================================================================

/// PostgreSQL-backed store. Clones share one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    products: PgProducts,
    invoices: PgInvoices,
    customers: PgCustomers,
    revenue: PgRevenue,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        PgStore {
            products: PgProducts { pool: pool.clone() },
            invoices: PgInvoices { pool: pool.clone() },
            customers: PgCustomers { pool: pool.clone() },
            revenue: PgRevenue { pool: pool.clone() },
            pool,
        }
    }

    /// Open a new pool. Prefer [`PgStore::shared`] outside of tests.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreError` if the database cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to PostgreSQL (max {} connections)",
            config.max_connections
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// The process-wide store, connected on first use.
    ///
    /// Concurrent first callers share one connection attempt. If it fails,
    /// nothing is cached and the next call tries again. `config` is only read
    /// by the call that actually connects.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreError` if the first connection attempt fails.
    pub async fn shared(config: &DatabaseConfig) -> Result<Arc<Self>> {
        SHARED.get_or_try_init(|| Self::connect(config)).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    type Products = PgProducts;
    type Invoices = PgInvoices;
    type Customers = PgCustomers;
    type Revenue = PgRevenue;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("lamp"), "lamp");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_status_totals_skip_unknown() {
        let totals = status_totals(vec![
            ("paid".to_string(), 150.0),
            ("draft".to_string(), 999.0),
            ("pending".to_string(), 30.0),
        ]);
        assert_eq!(
            totals,
            vec![
                StatusTotal {
                    status: InvoiceStatus::Paid,
                    total: 150.0,
                },
                StatusTotal {
                    status: InvoiceStatus::Pending,
                    total: 30.0,
                },
            ]
        );
    }

    #[test]
    fn test_invoice_row_with_unknown_status() {
        let invoice = Invoice::from(InvoiceRow {
            id: "i9".to_string(),
            customer_id: "c1".to_string(),
            amount: 12.5,
            status: "draft".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        });
        assert_eq!(invoice.status, InvoiceStatus::Unknown);
        assert_eq!(invoice.amount, 12.5);
    }
}

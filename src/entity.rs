//! Stored entities: products, invoices, customers, revenue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::Hash;
use std::str::FromStr;

/// Trait implemented by every record the store holds.
///
/// # Example
///
/// ```
/// use dashboard_kit::entity::{Customer, StoreEntity};
///
/// let customer = Customer {
///     id: "c1".to_string(),
///     name: "Lee Robinson".to_string(),
///     email: "lee@robinson.com".to_string(),
///     image_url: String::new(),
/// };
/// assert_eq!(customer.key(), "c1");
/// assert_eq!(Customer::collection(), "customers");
/// ```
pub trait StoreEntity: Send + Sync + Serialize + for<'de> Deserialize<'de> + Clone {
    /// Type of the record's identity.
    type Key: Display + Clone + Send + Sync + Eq + Hash + 'static;

    /// Return the record's identity.
    fn key(&self) -> Self::Key;

    /// Name of the collection (table) the record lives in.
    fn collection() -> &'static str;
}

// ============================================================================
// Identities
// ============================================================================

/// Integer identity of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProductId)
    }
}

/// An id as it arrives from a route or form: a number or a string.
///
/// Kept verbatim so error messages echo exactly what the caller sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    /// Resolve into a product id. `None` when the text is not an integer,
    /// which can never match a stored product.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            RawId::Number(n) => Some(ProductId(*n)),
            RawId::Text(s) => s.parse().ok(),
        }
    }
}

impl Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{}", n),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RawId {
    fn from(id: i64) -> Self {
        RawId::Number(id)
    }
}

impl From<ProductId> for RawId {
    fn from(id: ProductId) -> Self {
        RawId::Number(id.0)
    }
}

impl From<&str> for RawId {
    fn from(id: &str) -> Self {
        RawId::Text(id.to_string())
    }
}

impl From<String> for RawId {
    fn from(id: String) -> Self {
        RawId::Text(id)
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    /// Empty when the product has no image.
    pub image_url: String,
}

impl StoreEntity for Product {
    type Key = ProductId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn collection() -> &'static str {
        "products"
    }
}

/// Invoice status.
///
/// `Unknown` stands for any value outside the known set that a database row
/// may still carry. It is never parsed from text and never counted in totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Pending,
    Overdue,
    #[serde(other)]
    Unknown,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Unknown => "unknown",
        }
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(InvoiceStatus::Paid),
            "pending" => Ok(InvoiceStatus::Pending),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(format!("unknown invoice status: {}", other)),
        }
    }
}

/// An invoice. `customer_id` is not a declared relation: the customer may
/// have been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl StoreEntity for Invoice {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn collection() -> &'static str {
        "invoices"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

impl StoreEntity for Customer {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn collection() -> &'static str {
        "customers"
    }
}

/// One row of the revenue time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub month: String,
    pub revenue: f64,
}

impl StoreEntity for Revenue {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.month.clone()
    }

    fn collection() -> &'static str {
        "revenue"
    }
}

/// Sum of invoice amounts for one status, as returned by a grouped query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusTotal {
    pub status: InvoiceStatus,
    pub total: f64,
}

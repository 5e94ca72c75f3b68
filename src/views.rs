//! Presentation records returned by [`Dashboard`](crate::Dashboard) operations.
//!
//! Every monetary value appears formatted; product records also keep the raw
//! numeric price. All views serialize with serde and can be cached by a
//! [`PageCache`](crate::pages::PageCache).

use crate::entity::{Customer, Invoice, Product, ProductId};
use crate::error::DashboardError;
use crate::format::CurrencyFormat;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Name shown for an invoice whose customer no longer exists.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// A product with its price both raw and formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub price_formatted: String,
    pub image_url: String,
}

impl ProductView {
    pub fn new(product: Product, currency: &CurrencyFormat) -> Self {
        ProductView {
            price_formatted: currency.format(product.price),
            id: product.id,
            name: product.name,
            price: product.price,
            image_url: product.image_url,
        }
    }
}

/// The four summary cards at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    pub number_of_customers: u64,
    pub number_of_invoices: u64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}

/// One row of the "latest invoices" panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestInvoice {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: String,
}

impl LatestInvoice {
    /// Build a row from an invoice and its customer, if one was found.
    pub fn new(invoice: &Invoice, customer: Option<&Customer>, currency: &CurrencyFormat) -> Self {
        let (name, email, image_url) = match customer {
            Some(c) => (c.name.clone(), c.email.clone(), c.image_url.clone()),
            None => (UNKNOWN_CUSTOMER.to_string(), String::new(), String::new()),
        };
        LatestInvoice {
            id: invoice.id.clone(),
            name,
            email,
            image_url,
            amount: currency.format(invoice.amount),
        }
    }
}

/// Join invoices to customers resolved in a batch, keeping invoice order.
///
/// Invoices whose customer is missing from `customers` get placeholder
/// contact details.
pub fn assemble_latest_invoices(
    invoices: &[Invoice],
    customers: &HashMap<String, Customer>,
    currency: &CurrencyFormat,
) -> Vec<LatestInvoice> {
    invoices
        .iter()
        .map(|invoice| LatestInvoice::new(invoice, customers.get(&invoice.customer_id), currency))
        .collect()
}

/// Aggregate product figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: u64,
    /// Zero when there are no products.
    pub avg_price: f64,
    pub avg_price_formatted: String,
    pub highest_priced_product: Option<ProductView>,
}

/// One row of the "most popular products" panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    pub amount: String,
}

impl TopProduct {
    pub fn new(product: Product, currency: &CurrencyFormat) -> Self {
        TopProduct {
            amount: currency.format(product.price),
            id: product.id,
            name: product.name,
        }
    }
}

/// Outcome of a product mutation.
///
/// Serializes as `{"success": true}` or `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    Failure(DashboardError),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }

    pub fn error(&self) -> Option<&DashboardError> {
        match self {
            ActionResult::Success => None,
            ActionResult::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<(), DashboardError> {
        match self {
            ActionResult::Success => Ok(()),
            ActionResult::Failure(e) => Err(e),
        }
    }
}

impl From<Result<(), DashboardError>> for ActionResult {
    fn from(result: Result<(), DashboardError>) -> Self {
        match result {
            Ok(()) => ActionResult::Success,
            Err(e) => ActionResult::Failure(e),
        }
    }
}

impl Serialize for ActionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActionResult::Success => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("success", &true)?;
                map.end()
            }
            ActionResult::Failure(e) => e.serialize(serializer),
        }
    }
}

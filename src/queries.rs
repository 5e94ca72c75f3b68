//! Read operations: dashboard cards, panels and product listings.
//!
//! Every query reads the live store at call time. Store faults are logged and
//! replaced by the operation's generic failure message before they reach the
//! caller (see [`Error::surface`]).

use crate::backend::CacheBackend;
use crate::entity::{Customer, InvoiceStatus, Product, RawId, Revenue, StatusTotal};
use crate::error::{DashboardResult, Error, Result};
use crate::repository::{
    DataRepository, InvoiceRepository, ProductOrder, ProductRepository, Store,
};
use crate::service::Dashboard;
use crate::views::{
    assemble_latest_invoices, CardData, LatestInvoice, ProductStats, ProductView, TopProduct,
};
use futures::try_join;
use std::collections::HashMap;

fn total_for(totals: &[StatusTotal], status: InvoiceStatus) -> f64 {
    totals
        .iter()
        .filter(|t| t.status == status)
        .map(|t| t.total)
        .sum()
}

impl<S: Store, B: CacheBackend> Dashboard<S, B> {
    /// Customer and invoice counts plus paid and pending totals.
    ///
    /// The three reads run concurrently; if any fails the whole call fails.
    pub async fn fetch_card_data(&self) -> DashboardResult<CardData> {
        self.observe("fetch_card_data", self.load_card_data())
            .await
            .map_err(|e| e.surface("Failed to fetch card data."))
    }

    async fn load_card_data(&self) -> Result<CardData> {
        let (number_of_invoices, number_of_customers, totals) = try_join!(
            self.store.invoices().count(),
            self.store.customers().count(),
            self.store.invoices().sum_by_status(),
        )?;

        let currency = &self.config.currency;
        Ok(CardData {
            number_of_customers,
            number_of_invoices,
            total_paid_invoices: currency.format(total_for(&totals, InvoiceStatus::Paid)),
            total_pending_invoices: currency.format(total_for(&totals, InvoiceStatus::Pending)),
        })
    }

    /// The most recent invoices with their customers, newest first.
    pub async fn fetch_latest_invoices(&self) -> DashboardResult<Vec<LatestInvoice>> {
        self.observe("fetch_latest_invoices", self.load_latest_invoices())
            .await
            .map_err(|e| e.surface("Failed to fetch the latest invoices."))
    }

    async fn load_latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
        let invoices = self
            .store
            .invoices()
            .latest(self.config.latest_invoices)
            .await?;

        let mut customer_ids: Vec<String> =
            invoices.iter().map(|i| i.customer_id.clone()).collect();
        customer_ids.sort();
        customer_ids.dedup();

        let customers: HashMap<String, Customer> = self
            .store
            .customers()
            .fetch_by_ids(&customer_ids)
            .await?
            .into_iter()
            .flatten()
            .map(|c| (c.id.clone(), c))
            .collect();

        if customers.len() < customer_ids.len() {
            debug!(
                "{} of {} invoice customers not found",
                customer_ids.len() - customers.len(),
                customer_ids.len()
            );
        }

        Ok(assemble_latest_invoices(
            &invoices,
            &customers,
            &self.config.currency,
        ))
    }

    /// Every product, newest (highest id) first.
    pub async fn fetch_products(&self) -> DashboardResult<Vec<ProductView>> {
        self.observe(
            "fetch_products",
            self.load_products(ProductOrder::IdDesc, None),
        )
        .await
        .map_err(|e| e.surface("Failed to fetch product data."))
    }

    async fn load_products(
        &self,
        order: ProductOrder,
        limit: Option<usize>,
    ) -> Result<Vec<ProductView>> {
        let products = self.store.products().list(order, limit).await?;
        Ok(self.product_views(products))
    }

    fn product_views(&self, products: Vec<Product>) -> Vec<ProductView> {
        products
            .into_iter()
            .map(|p| ProductView::new(p, &self.config.currency))
            .collect()
    }

    /// A single product.
    ///
    /// `id` may be a number or the raw string from a route. A string that is
    /// not an integer cannot name a product and is reported as not found.
    pub async fn fetch_product_by_id(&self, id: impl Into<RawId>) -> DashboardResult<ProductView> {
        let raw = id.into();
        self.observe("fetch_product_by_id", self.load_product(&raw))
            .await
            .map_err(|e| {
                let message = match &e {
                    Error::NotFound { .. } => e.to_string(),
                    _ => format!("Failed to fetch product with ID {}.", raw),
                };
                e.surface(message)
            })
    }

    async fn load_product(&self, raw: &RawId) -> Result<ProductView> {
        let found = match raw.product_id() {
            Some(id) => self.store.products().fetch_by_id(&id).await?,
            None => None,
        };
        found
            .map(|p| ProductView::new(p, &self.config.currency))
            .ok_or_else(|| Error::NotFound {
                entity: "Product",
                id: raw.to_string(),
            })
    }

    /// Products whose name contains `query`, ignoring case, by name.
    pub async fn search_products(&self, query: &str) -> DashboardResult<Vec<ProductView>> {
        let work = async {
            let products = self.store.products().search(query).await?;
            Ok::<_, Error>(self.product_views(products))
        };
        self.observe("search_products", work)
            .await
            .map_err(|e| e.surface("Failed to search products."))
    }

    /// Product count, average price and the most expensive product.
    pub async fn product_stats(&self) -> DashboardResult<ProductStats> {
        self.observe("product_stats", self.load_product_stats())
            .await
            .map_err(|e| e.surface("Failed to get product statistics."))
    }

    async fn load_product_stats(&self) -> Result<ProductStats> {
        let products = self.store.products();
        let (total_products, average, highest) = try_join!(
            products.count(),
            products.average_price(),
            products.highest_priced(),
        )?;

        let avg_price = average.unwrap_or(0.0);
        let currency = &self.config.currency;
        Ok(ProductStats {
            total_products,
            avg_price,
            avg_price_formatted: currency.format(avg_price),
            highest_priced_product: highest.map(|p| ProductView::new(p, currency)),
        })
    }

    /// The revenue time series in stored order.
    pub async fn fetch_revenue(&self) -> DashboardResult<Vec<Revenue>> {
        self.observe("fetch_revenue", self.store.revenue().fetch_all())
            .await
            .map_err(|e| e.surface("Failed to fetch revenue data."))
    }

    /// The most expensive products, for the "most popular products" panel.
    pub async fn fetch_top_products(&self) -> DashboardResult<Vec<TopProduct>> {
        let work = async {
            let products = self
                .store
                .products()
                .list(ProductOrder::PriceDesc, Some(self.config.top_products))
                .await?;
            Ok::<_, Error>(
                products
                    .into_iter()
                    .map(|p| TopProduct::new(p, &self.config.currency))
                    .collect(),
            )
        };
        self.observe("fetch_top_products", work)
            .await
            .map_err(|e| e.surface("Failed to fetch top products."))
    }
}

//! Product mutations: create, update, delete.
//!
//! Each action validates its form input before touching the store, performs a
//! single-statement write, and on success revalidates the product listing
//! page. The outcome is always an [`ActionResult`]; nothing propagates past
//! the boundary.
//!
//! Update and delete report a missing id with the same message as any other
//! failure. The error kind ([`ErrorKind::NotFound`](crate::ErrorKind)) tells
//! the two apart for callers that need to.

use crate::backend::CacheBackend;
use crate::entity::{ProductId, RawId};
use crate::error::{Error, Result};
use crate::input::{FormData, ProductInput};
use crate::pages::PRODUCTS_PATH;
use crate::repository::{ProductRepository, Store};
use crate::service::Dashboard;
use crate::views::ActionResult;

fn resolve(raw: &RawId) -> Result<ProductId> {
    raw.product_id().ok_or_else(|| Error::NotFound {
        entity: "Product",
        id: raw.to_string(),
    })
}

impl<S: Store, B: CacheBackend> Dashboard<S, B> {
    /// Create a product from form fields.
    pub async fn create_product(&self, form: &FormData) -> ActionResult {
        let work = async {
            let input = ProductInput::parse(form)?;
            let product = self.store.products().create(&input).await?;
            info!("Created product {} ({})", product.id, product.name);
            Ok::<_, Error>(())
        };
        let outcome = self.observe("create_product", work).await;
        self.finish(outcome, "Failed to create product.").await
    }

    /// Replace the name, price and image of an existing product.
    pub async fn update_product(&self, id: impl Into<RawId>, form: &FormData) -> ActionResult {
        let raw = id.into();
        let work = async {
            let input = ProductInput::parse(form)?;
            let id = resolve(&raw)?;
            match self.store.products().update(id, &input).await? {
                Some(product) => {
                    info!("Updated product {} ({})", product.id, product.name);
                    Ok::<_, Error>(())
                }
                None => Err(Error::NotFound {
                    entity: "Product",
                    id: raw.to_string(),
                }),
            }
        };
        let outcome = self.observe("update_product", work).await;
        self.finish(outcome, "Failed to update product.").await
    }

    /// Permanently remove a product.
    pub async fn delete_product(&self, id: impl Into<RawId>) -> ActionResult {
        let raw = id.into();
        let work = async {
            let id = resolve(&raw)?;
            if self.store.products().delete(id).await? {
                info!("Deleted product {}", id);
                Ok::<_, Error>(())
            } else {
                Err(Error::NotFound {
                    entity: "Product",
                    id: raw.to_string(),
                })
            }
        };
        let outcome = self.observe("delete_product", work).await;
        self.finish(outcome, "Failed to delete product.").await
    }

    async fn finish(&self, outcome: Result<()>, failure: &str) -> ActionResult {
        match outcome {
            Ok(()) => {
                self.revalidate_products().await;
                ActionResult::Success
            }
            Err(e) => ActionResult::Failure(e.surface(failure)),
        }
    }

    /// The write already happened, so a failed revalidation only means stale
    /// pages until their TTL runs out.
    async fn revalidate_products(&self) {
        match self.pages.revalidate_path(PRODUCTS_PATH).await {
            Ok(_) => self.metrics.record_revalidation(PRODUCTS_PATH),
            Err(e) => warn!("Failed to revalidate {}: {}", PRODUCTS_PATH, e),
        }
    }
}

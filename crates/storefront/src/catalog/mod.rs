//! Remote product catalog client.
//!
//! # Architecture
//!
//! - The storefront does not own product data: products and stock live in a
//!   remote catalog service and are fetched over plain REST + JSON
//!   (`GET products`, `GET products/{id}`, `GET stock/{id}`).
//! - Product lookups are cached in-memory via `moka` (5 minute TTL).
//! - Stock lookups are never cached: every quantity check reads the
//!   current value.
//!
//! Consumers go through the [`Catalog`] trait so the cart store can be
//! exercised against a fake catalog in tests.

mod http;
pub mod types;

pub use http::HttpCatalog;
pub use types::{Product, StockLevel};

use async_trait::async_trait;
use thiserror::Error;

use shoestring_core::ProductId;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the catalog.
    #[error("Catalog request failed with status {0}")]
    Status(u16),

    /// The catalog has no such product.
    #[error("Product {0} not found in catalog")]
    NotFound(ProductId),

    /// JSON decoding failed.
    #[error("Catalog response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read access to the remote product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// List all products.
    async fn products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Fetch a single product by id.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Fetch the available stock for a product.
    ///
    /// Implementations must not cache this: quantity validation relies on
    /// a fresh value per call.
    async fn stock(&self, id: ProductId) -> Result<StockLevel, CatalogError>;
}

//! HTTP implementation of the catalog client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use shoestring_core::ProductId;

use super::types::{Product, StockLevel};
use super::{Catalog, CatalogError};

/// Cached catalog values.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Client for the remote catalog API.
///
/// Products are cached for 5 minutes; stock is always fetched fresh.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<HttpCatalogInner>,
}

struct HttpCatalogInner {
    client: reqwest::Client,
    /// Base URL without a trailing slash.
    base: String,
    cache: Cache<String, CacheValue>,
}

impl HttpCatalog {
    /// Create a new catalog client for the given base URL.
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(HttpCatalogInner {
                client: reqwest::Client::new(),
                base: base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    /// Execute a GET request and decode the JSON body.
    ///
    /// `missing` is the product a 404 refers to, for by-id endpoints.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        missing: Option<ProductId>,
    ) -> Result<T, CatalogError> {
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND
            && let Some(id) = missing
        {
            return Err(CatalogError::NotFound(id));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(200).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status(status.as_u16()));
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(200).collect::<String>(),
                    "Failed to decode catalog response"
                );
                Err(CatalogError::Decode(e))
            }
        }
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        const CACHE_KEY: &str = "products";

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(CACHE_KEY).await {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .get_json(format!("{}/products", self.inner.base), None)
            .await?;

        self.inner
            .cache
            .insert(CACHE_KEY.to_string(), CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .get_json(
                format!("{}/products/{}", self.inner.base, id.as_i64()),
                Some(id),
            )
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // No cache lookup here: a stale stock amount would let the cart sell
    // units the catalog no longer has.
    #[instrument(skip(self), fields(id = %id))]
    async fn stock(&self, id: ProductId) -> Result<StockLevel, CatalogError> {
        self.get_json(format!("{}/stock/{}", self.inner.base, id.as_i64()), Some(id))
            .await
    }
}

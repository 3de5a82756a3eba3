//! The cart store.
//!
//! [`CartStore`] owns the in-memory list of line items and mediates every
//! mutation: add one unit of a product, remove a product, set a product's
//! quantity. Each quantity-changing mutation is validated against a fresh
//! stock read from the catalog, and every successful mutation writes the
//! whole cart to the snapshot slot before the in-memory state is replaced.
//!
//! Failures never reach the caller: they are converted into user-facing
//! notifications and leave both the in-memory cart and the snapshot
//! untouched. There is no retry; a failed intent is a no-op.
//!
//! Operations deliberately do not serialize against each other. Each one
//! reads the cart as of its own start, suspends only across catalog
//! fetches, and commits by overwrite - last write wins, which is acceptable
//! for a cart driven by a single user.

pub mod storage;

pub use storage::{CartStorage, MemoryCartStorage, PgCartStorage, StorageError};

use std::sync::{Arc, PoisonError, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};

use shoestring_core::ProductId;

use crate::catalog::{Catalog, CatalogError, Product};
use crate::services::toast::Notifier;

/// Storage slot holding the serialized cart.
pub const CART_SLOT: &str = "shoestring:cart";

/// One product entry in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    /// Unit price at the time the product was added.
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
    /// Quantity in the cart, always >= 1.
    pub amount: i64,
}

impl LineItem {
    /// The line item created when a product first enters the cart.
    fn first_of(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: 1,
        }
    }
}

/// Why a cart mutation was rejected.
///
/// Display strings double as the user-facing notification messages.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the available stock, or the stock is empty.
    #[error("Requested quantity is out of stock")]
    OutOfStock,

    /// The product lookup returned nothing.
    #[error("The product could not be loaded")]
    ProductFetch,

    /// The product is not in the cart.
    #[error("Could not remove the product from the cart")]
    NotInCart,

    /// Requested quantity is below the minimum of 1.
    #[error("Quantity must be at least 1")]
    InvalidAmount,

    /// The catalog could not be reached.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The snapshot could not be persisted.
    #[error("Could not save the cart: {0}")]
    Storage(#[from] StorageError),

    /// The snapshot could not be encoded.
    #[error("Could not encode the cart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// User-facing messages not tied to a single `CartError` variant.
mod messages {
    pub const ADD_FAILED: &str = "Could not add the product to the cart";
    pub const UPDATE_FAILED: &str = "Could not change the product quantity";
}

/// State container for the shopping cart.
///
/// Cheaply cloneable via `Arc`; all clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    items: RwLock<Vec<LineItem>>,
    catalog: Arc<dyn Catalog>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Create a store and restore the cart from the snapshot slot.
    ///
    /// A missing, unreadable, or corrupt snapshot yields an empty cart.
    pub async fn restore(
        catalog: Arc<dyn Catalog>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let items = match storage.get(CART_SLOT).await {
            Ok(Some(snapshot)) => match serde_json::from_str(&snapshot) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt cart snapshot");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart snapshot");
                Vec::new()
            }
        };

        Self {
            inner: Arc::new(CartStoreInner {
                items: RwLock::new(items),
                catalog,
                storage,
                notifier,
            }),
        }
    }

    /// Current cart contents, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items().iter().map(|item| item.amount).sum()
    }

    /// Add one unit of a product to the cart.
    ///
    /// A product not yet in the cart enters with amount 1; a product already
    /// present is incremented, capped by the available stock. Every failure
    /// also surfaces the generic add-failure message after the specific one.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn add_product(&self, id: ProductId) {
        if let Err(err) = self.try_add(id).await {
            warn!(error = %err, "Add to cart rejected");
            self.inner.notifier.error(&err.to_string());
            self.inner.notifier.error(messages::ADD_FAILED);
        }
    }

    /// Remove a product from the cart entirely.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove_product(&self, id: ProductId) {
        if let Err(err) = self.try_remove(id).await {
            warn!(error = %err, "Remove from cart rejected");
            self.inner.notifier.error(&err.to_string());
        }
    }

    /// Set a product's quantity.
    ///
    /// Catalog failures additionally surface the generic quantity-change
    /// message before the specific one.
    #[instrument(skip(self), fields(id = %id, amount))]
    pub async fn update_product_amount(&self, id: ProductId, amount: i64) {
        if let Err(err) = self.try_update(id, amount).await {
            warn!(error = %err, "Quantity change rejected");
            if matches!(err, CartError::Catalog(_)) {
                self.inner.notifier.error(messages::UPDATE_FAILED);
            }
            self.inner.notifier.error(&err.to_string());
        }
    }

    async fn try_add(&self, id: ProductId) -> Result<(), CartError> {
        let stock = self.inner.catalog.stock(id).await?;
        if stock.amount <= 0 {
            return Err(CartError::OutOfStock);
        }

        // Cart as of this intent; a concurrent mutation wins by overwrite.
        let mut next = self.items();
        if let Some(item) = next.iter_mut().find(|item| item.id == id) {
            if item.amount >= stock.amount {
                return Err(CartError::OutOfStock);
            }
            item.amount += 1;
        } else {
            let product = match self.inner.catalog.product(id).await {
                Ok(product) => product,
                Err(CatalogError::NotFound(_)) => return Err(CartError::ProductFetch),
                Err(err) => return Err(err.into()),
            };
            next.push(LineItem::first_of(product));
        }

        self.commit(next).await
    }

    async fn try_remove(&self, id: ProductId) -> Result<(), CartError> {
        let items = self.items();
        if !items.iter().any(|item| item.id == id) {
            return Err(CartError::NotInCart);
        }

        let next = items.into_iter().filter(|item| item.id != id).collect();
        self.commit(next).await
    }

    async fn try_update(&self, id: ProductId, amount: i64) -> Result<(), CartError> {
        let stock = self.inner.catalog.stock(id).await?;
        // Stock is checked before the lower bound: a request violating both
        // reports the stock error.
        if stock.amount < amount {
            return Err(CartError::OutOfStock);
        }
        if amount < 1 {
            return Err(CartError::InvalidAmount);
        }

        let next = self
            .items()
            .into_iter()
            .map(|item| {
                if item.id == id {
                    LineItem { amount, ..item }
                } else {
                    item
                }
            })
            .collect();

        self.commit(next).await
    }

    /// Write-through commit: persist first, then replace the in-memory cart.
    async fn commit(&self, next: Vec<LineItem>) -> Result<(), CartError> {
        let encoded = serde_json::to_string(&next)?;
        self.inner.storage.set(CART_SLOT, &encoded).await?;
        *self
            .inner
            .items
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }
}

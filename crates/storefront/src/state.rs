//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cart::{CartStore, PgCartStorage};
use crate::catalog::{Catalog, HttpCatalog};
use crate::config::StorefrontConfig;
use crate::services::toast::{Notifier, ToastQueue};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the cart store, the catalog client and
/// configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: Arc<dyn Catalog>,
    cart: CartStore,
    toasts: Arc<ToastQueue>,
}

impl AppState {
    /// Create the application state and restore the persisted cart.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    pub async fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog: Arc<dyn Catalog> = Arc::new(HttpCatalog::new(&config.catalog_url));
        let toasts = Arc::new(ToastQueue::new());
        let storage = Arc::new(PgCartStorage::new(pool.clone()));

        let cart = CartStore::restore(
            Arc::clone(&catalog),
            storage,
            Arc::clone(&toasts) as Arc<dyn Notifier>,
        )
        .await;

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                cart,
                toasts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the toast queue.
    #[must_use]
    pub fn toasts(&self) -> &ToastQueue {
        &self.inner.toasts
    }
}

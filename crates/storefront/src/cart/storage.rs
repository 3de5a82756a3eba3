//! Cart snapshot persistence.
//!
//! The cart is persisted write-through into a single string-keyed slot.
//! The [`CartStorage`] trait is a plain get/set contract so the backing
//! store can be swapped: `PostgreSQL` in production, in-memory in tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

/// Errors from the snapshot store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Cart storage error: {0}")]
    Database(#[from] sqlx::Error),
}

/// String-keyed snapshot storage.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// `PostgreSQL`-backed snapshot storage.
///
/// One row per slot in the `cart_snapshots` table; `set` is an upsert.
#[derive(Clone)]
pub struct PgCartStorage {
    pool: PgPool,
}

impl PgCartStorage {
    /// Create a snapshot store on top of an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStorage for PgCartStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = sqlx::query_scalar("SELECT data FROM cart_snapshots WHERE slot = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(data)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO cart_snapshots (slot, data) VALUES ($1, $2)
             ON CONFLICT (slot) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// In-memory snapshot storage.
///
/// Substitutable for tests and local development; contents die with the
/// process.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCartStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let storage = MemoryCartStorage::new();
        assert!(storage.get("cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let storage = MemoryCartStorage::new();
        storage.set("cart", "[]").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_set_overwrites_wholesale() {
        let storage = MemoryCartStorage::new();
        storage.set("cart", "old").await.unwrap();
        storage.set("cart", "new").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("new"));
    }
}

//! Owner-scoped inventory storage.
//!
//! `InventoryStore` is the boundary; `InMemoryInventoryStore` serves tests and
//! local development, `PostgresInventoryStore` serves production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use r#trait::{BuildReceipt, InventoryStore, StoreError};

use crate::config::AppConfig;

/// Open the store selected by configuration.
///
/// With `DATABASE_URL` set this connects, bootstraps the schema and returns the
/// Postgres store; otherwise it returns a fresh in-memory store.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn InventoryStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresInventoryStore::connect(url, config.database_max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres inventory store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory inventory store");
            Ok(Arc::new(InMemoryInventoryStore::new()))
        }
    }
}

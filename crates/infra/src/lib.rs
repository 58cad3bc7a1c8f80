//! Infrastructure layer: configuration and storage.
//!
//! The store owns persistence and the transactional build commit; the
//! feasibility arithmetic itself comes from `inventoryflow-build`.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{BuildReceipt, InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError};

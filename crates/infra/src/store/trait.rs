use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventoryflow_build::{BomLine, BuildError, Feasibility, StockDecrement, calculate_feasibility};
use inventoryflow_core::{DomainError, ItemId, OwnerId, ProductId};
use inventoryflow_inventory::{Item, ItemPatch, NewItem};
use inventoryflow_products::{BomEntry, ComponentSpec, NewProduct, Product};

/// Store operation error.
///
/// Domain and build errors pass through unchanged so the HTTP layer can map
/// them precisely; everything the backend itself reports is folded into
/// `Storage` and never leaks a partial write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate key or a row that changed under a build commit.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

/// Outcome of a committed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReceipt {
    pub product_id: ProductId,
    pub built: i64,
    pub decrements: Vec<StockDecrement>,
}

/// Owner-scoped persistence for items, products and their BOMs.
///
/// Every method takes the acting owner; rows belonging to another owner behave
/// exactly like missing rows.
///
/// ## Build commits
///
/// `commit_build` must re-read the BOM joined with live stock, plan the build
/// with [`inventoryflow_build::plan_build`] and apply every decrement inside
/// one transaction. Either all qualifying items move, or none do.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    async fn create_item(&self, owner: OwnerId, item: NewItem) -> Result<Item, StoreError>;

    /// Newest first.
    async fn list_items(&self, owner: OwnerId) -> Result<Vec<Item>, StoreError>;

    async fn get_item(&self, owner: OwnerId, id: ItemId) -> Result<Item, StoreError>;

    async fn update_item(&self, owner: OwnerId, id: ItemId, patch: ItemPatch) -> Result<Item, StoreError>;

    /// Also removes every BOM entry that references the item.
    async fn delete_item(&self, owner: OwnerId, id: ItemId) -> Result<(), StoreError>;

    /// Items with `required_per_product > 0`, oldest first, as BOM lines.
    async fn load_required_items(&self, owner: OwnerId) -> Result<Vec<BomLine>, StoreError>;

    /// Fails with `Conflict` when the owner already has a product with that name.
    async fn create_product(&self, owner: OwnerId, product: NewProduct) -> Result<Product, StoreError>;

    /// Newest first.
    async fn list_products(&self, owner: OwnerId) -> Result<Vec<Product>, StoreError>;

    async fn get_product(&self, owner: OwnerId, id: ProductId) -> Result<Product, StoreError>;

    /// Add or update one BOM entry, keyed by `(product, item)`.
    async fn upsert_component(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        spec: ComponentSpec,
    ) -> Result<BomEntry, StoreError>;

    async fn remove_component(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        item_id: ItemId,
    ) -> Result<(), StoreError>;

    /// BOM joined with live stock, in the order entries were first added.
    async fn load_bom(&self, owner: OwnerId, product_id: ProductId) -> Result<Vec<BomLine>, StoreError>;

    /// Build `quantity` units, deducting stock atomically.
    async fn commit_build(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<BuildReceipt, StoreError>;

    /// Feasibility of a product against current stock.
    async fn can_build(&self, owner: OwnerId, product_id: ProductId) -> Result<Feasibility, StoreError> {
        let bom = self.load_bom(owner, product_id).await?;
        Ok(calculate_feasibility(&bom))
    }

    /// Feasibility of the owner's implicit product (items with a per-product requirement).
    async fn calculate_inventory(&self, owner: OwnerId) -> Result<Feasibility, StoreError> {
        let lines = self.load_required_items(owner).await?;
        Ok(calculate_feasibility(&lines))
    }
}

/// Reject non-positive quantities before touching storage.
pub(crate) fn ensure_positive_quantity(quantity: i64) -> Result<(), StoreError> {
    if quantity <= 0 {
        return Err(BuildError::InvalidQuantity.into());
    }
    Ok(())
}

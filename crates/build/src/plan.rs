//! Turning a build request into a bounds-checked set of stock decrements.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventoryflow_core::{ExpectedVersion, ItemId};

use crate::bom::BomLine;
use crate::feasibility::calculate_feasibility;

/// Why a build cannot be committed. All variants are recoverable by the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    #[error("no parts linked to this product")]
    EmptyBom,

    #[error("not enough stock: requested {requested}, can build {can_build}")]
    InsufficientStock { can_build: i64, requested: i64 },
}

/// Stock change for a single item within a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDecrement {
    pub item_id: ItemId,
    pub name: String,
    /// Version the snapshot was read at; the write must still see it.
    pub expected_version: u64,
    pub old_stock: i64,
    pub new_stock: i64,
}

impl StockDecrement {
    pub fn amount(&self) -> i64 {
        self.old_stock - self.new_stock
    }

    pub fn expected(&self) -> ExpectedVersion {
        ExpectedVersion::Exact(self.expected_version)
    }
}

/// Everything a store needs to commit a build atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub quantity: i64,
    pub can_build: i64,
    /// One per qualifying entry, in BOM order. Non-qualifying entries are untouched.
    pub decrements: Vec<StockDecrement>,
}

/// Plan a build of `quantity` units against a freshly read snapshot.
///
/// Checks run in order: quantity, BOM, stock. On success every decrement
/// satisfies `new_stock = old_stock - required * quantity >= 0`.
pub fn plan_build(bom: &[BomLine], quantity: i64) -> Result<BuildPlan, BuildError> {
    if quantity <= 0 {
        return Err(BuildError::InvalidQuantity);
    }

    let feasibility = calculate_feasibility(bom);
    if !feasibility.has_qualifying_entries() {
        return Err(BuildError::EmptyBom);
    }
    if quantity > feasibility.can_build {
        return Err(BuildError::InsufficientStock {
            can_build: feasibility.can_build,
            requested: quantity,
        });
    }

    let decrements = bom
        .iter()
        .filter(|line| line.is_qualifying())
        .map(|line| StockDecrement {
            item_id: line.item_id,
            name: line.name.clone(),
            expected_version: line.version,
            old_stock: line.stock,
            // quantity <= stock / required, so this cannot overflow or go negative.
            new_stock: line.stock - line.required * quantity,
        })
        .collect();

    Ok(BuildPlan {
        quantity,
        can_build: feasibility.can_build,
        decrements,
    })
}

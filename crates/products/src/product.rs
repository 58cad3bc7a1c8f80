use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inventoryflow_core::{DomainError, DomainResult, Entity, OwnerId, ProductId};

/// A buildable product. Its composition lives in [`crate::BomEntry`] rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub owner_id: OwnerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
}

impl NewProduct {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Validate and materialize the product.
    ///
    /// Name uniqueness per owner needs storage support and is enforced by the
    /// store before insert.
    pub fn into_product(
        self,
        id: ProductId,
        owner_id: OwnerId,
        now: DateTime<Utc>,
    ) -> DomainResult<Product> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Product {
            id,
            owner_id,
            name: name.to_string(),
            created_at: now,
        })
    }
}

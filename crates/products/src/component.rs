//! Bill-of-materials entries (product components).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inventoryflow_core::{DomainError, DomainResult, ItemId, ProductId};

/// One line of a product's bill of materials.
///
/// Unique per `(product_id, item_id)`. `required` is the number of item units
/// consumed per product unit; zero is stored but never limits a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomEntry {
    pub product_id: ProductId,
    pub item_id: ItemId,
    pub required: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BomEntry {
    pub fn new(
        product_id: ProductId,
        item_id: ItemId,
        required: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_required(required)?;
        Ok(Self {
            product_id,
            item_id,
            required,
            created_at: now,
            updated_at: now,
        })
    }

    /// Change the per-unit requirement, keeping the entry's position in the BOM.
    pub fn set_required(&mut self, required: i64, now: DateTime<Utc>) -> DomainResult<()> {
        validate_required(required)?;
        self.required = required;
        self.updated_at = now;
        Ok(())
    }

    /// Whether this entry constrains the buildable quantity.
    pub fn is_qualifying(&self) -> bool {
        self.required > 0
    }
}

/// How an upsert names the item it links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartRef {
    /// An existing item.
    Id(ItemId),
    /// An item looked up by exact name; created when missing.
    Name(String),
}

/// Request to add or update one component of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub part: PartRef,
    pub required: i64,
    /// When present, overwrites the item's on-hand stock before linking.
    pub stock: Option<i64>,
}

impl ComponentSpec {
    /// Validate and normalize (item names are trimmed).
    pub fn validated(self) -> DomainResult<Self> {
        validate_required(self.required)?;
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err(DomainError::validation("stock cannot be negative"));
            }
        }
        let part = match self.part {
            PartRef::Id(id) => PartRef::Id(id),
            PartRef::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(DomainError::validation("item name cannot be empty"));
                }
                PartRef::Name(name.to_string())
            }
        };
        Ok(Self {
            part,
            required: self.required,
            stock: self.stock,
        })
    }
}

fn validate_required(required: i64) -> DomainResult<()> {
    if required < 0 {
        return Err(DomainError::validation("required cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_required_is_stored_but_not_qualifying() {
        let entry = BomEntry::new(ProductId::new(), ItemId::new(), 0, Utc::now()).unwrap();
        assert!(!entry.is_qualifying());

        let entry = BomEntry::new(ProductId::new(), ItemId::new(), 2, Utc::now()).unwrap();
        assert!(entry.is_qualifying());
    }

    #[test]
    fn set_required_keeps_creation_time() {
        let created = Utc::now();
        let mut entry = BomEntry::new(ProductId::new(), ItemId::new(), 1, created).unwrap();
        entry.set_required(4, created + chrono::Duration::seconds(5)).unwrap();

        assert_eq!(entry.required, 4);
        assert_eq!(entry.created_at, created);
        assert!(entry.updated_at > created);
        assert!(entry.set_required(-1, Utc::now()).is_err());
        assert_eq!(entry.required, 4);
    }

    #[test]
    fn negative_required_is_rejected() {
        let err = BomEntry::new(ProductId::new(), ItemId::new(), -1, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn spec_trims_item_name() {
        let spec = ComponentSpec {
            part: PartRef::Name("  Wheel ".to_string()),
            required: 2,
            stock: Some(10),
        }
        .validated()
        .unwrap();
        assert_eq!(spec.part, PartRef::Name("Wheel".to_string()));
    }

    #[test]
    fn spec_rejects_blank_name_and_negative_stock() {
        let blank = ComponentSpec {
            part: PartRef::Name("   ".to_string()),
            required: 1,
            stock: None,
        };
        assert!(blank.validated().is_err());

        let negative = ComponentSpec {
            part: PartRef::Id(ItemId::new()),
            required: 1,
            stock: Some(-3),
        };
        assert!(negative.validated().is_err());
    }
}

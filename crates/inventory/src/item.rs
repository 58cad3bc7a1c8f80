use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inventoryflow_core::{DomainError, DomainResult, Entity, ExpectedVersion, ItemId, OwnerId};

/// Category assigned to items that are created implicitly (e.g. when a BOM
/// entry names an item that does not exist yet).
pub const DEFAULT_CATEGORY: &str = "General";

/// A stock item owned by a single user.
///
/// `quantity` is the on-hand stock and never goes negative. `version` starts at
/// 1 and increases by one on every mutation; build commits use it for their
/// optimistic check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub owner_id: OwnerId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    /// Per-unit requirement for the owner's implicit single product.
    pub required_per_product: i64,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}

/// Input for creating an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub required_per_product: i64,
}

impl NewItem {
    /// An item with zero stock and no legacy requirement.
    pub fn named(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity: 0,
            required_per_product: 0,
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_required_per_product(mut self, required: i64) -> Self {
        self.required_per_product = required;
        self
    }

    /// Validate and materialize the item at version 1.
    pub fn into_item(self, id: ItemId, owner_id: OwnerId, now: DateTime<Utc>) -> DomainResult<Item> {
        let name = validate_text("name", &self.name)?;
        let category = validate_text("category", &self.category)?;
        validate_quantity(self.quantity)?;
        validate_required(self.required_per_product)?;

        Ok(Item {
            id,
            owner_id,
            name,
            category,
            quantity: self.quantity,
            required_per_product: self.required_per_product,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of an item. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub required_per_product: Option<i64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.required_per_product.is_none()
    }

    /// Apply the patch. Every field is validated before anything is written,
    /// so a rejected patch leaves the item untouched.
    pub fn apply(&self, item: &mut Item, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_empty() {
            return Ok(());
        }

        let name = self.name.as_deref().map(|n| validate_text("name", n)).transpose()?;
        let category = self
            .category
            .as_deref()
            .map(|c| validate_text("category", c))
            .transpose()?;
        if let Some(q) = self.quantity {
            validate_quantity(q)?;
        }
        if let Some(r) = self.required_per_product {
            validate_required(r)?;
        }

        if let Some(name) = name {
            item.name = name;
        }
        if let Some(category) = category {
            item.category = category;
        }
        if let Some(q) = self.quantity {
            item.quantity = q;
        }
        if let Some(r) = self.required_per_product {
            item.required_per_product = r;
        }
        item.touch(now);
        Ok(())
    }
}

impl Item {
    /// Overwrite the on-hand stock (manual stock edit).
    pub fn set_stock(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        validate_quantity(quantity)?;
        self.quantity = quantity;
        self.touch(now);
        Ok(())
    }

    /// Remove `amount` units from stock, as part of a build commit.
    ///
    /// Rejects stale versions and any withdrawal that would leave the stock
    /// negative; on error the item is unchanged.
    pub fn withdraw(
        &mut self,
        amount: i64,
        expected: ExpectedVersion,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        expected.check(self.version)?;
        if amount < 0 {
            return Err(DomainError::validation("withdrawal amount cannot be negative"));
        }
        let remaining = self
            .quantity
            .checked_sub(amount)
            .filter(|r| *r >= 0)
            .ok_or_else(|| DomainError::invariant("stock cannot go negative"))?;

        self.quantity = remaining;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

fn validate_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn validate_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

fn validate_required(required: i64) -> DomainResult<()> {
    if required < 0 {
        return Err(DomainError::validation("required per product cannot be negative"));
    }
    Ok(())
}

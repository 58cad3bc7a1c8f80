//! Entity trait: identity + continuity across state changes.

use crate::id::OwnerId;

/// Entity marker + minimal interface.
///
/// Every persisted entity in InventoryFlow belongs to exactly one owner, so
/// ownership is part of the identity contract.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Returns the owner the entity is scoped to.
    fn owner_id(&self) -> OwnerId;
}

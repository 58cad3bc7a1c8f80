//! Inventory domain module.
//!
//! This crate contains business rules for stock items, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{Item, ItemPatch, NewItem, DEFAULT_CATEGORY};

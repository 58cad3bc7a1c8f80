//! Products domain module.
//!
//! This crate contains business rules for products and their bill of materials,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod component;
pub mod product;

pub use component::{BomEntry, ComponentSpec, PartRef};
pub use product::{NewProduct, Product};

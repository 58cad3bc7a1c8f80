//! Build feasibility engine.
//!
//! Given a product's bill of materials joined with live stock, this crate
//! answers two questions, both as pure functions:
//!
//! - how many complete units can be assembled right now
//!   ([`calculate_feasibility`]), and
//! - which stock decrements a build of `n` units implies ([`plan_build`]).
//!
//! Reading the snapshot and applying the plan atomically is the store's job;
//! nothing here performs IO or logs.

pub mod bom;
pub mod feasibility;
pub mod plan;

pub use bom::BomLine;
pub use feasibility::{Feasibility, PartFeasibility, calculate_feasibility};
pub use plan::{BuildError, BuildPlan, StockDecrement, plan_build};

//! `inventoryflow-auth`: bearer-token boundary.
//!
//! Tokens are issued elsewhere; this crate only decodes them, checks the
//! signature and time window, and yields the owner the request acts as. It is
//! decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use roles::Role;

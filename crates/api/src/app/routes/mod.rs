use axum::{Router, routing::get};

pub mod inventory;
pub mod items;
pub mod products;
pub mod system;

/// Router for all authenticated (owner-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/items", items::router())
        .nest("/inventory", inventory::router())
        .nest("/products", products::router())
}

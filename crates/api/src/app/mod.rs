//! HTTP API application wiring (Axum router + store wiring).
//!
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use inventoryflow_infra::{AppConfig, InventoryStore, StoreError, store::open_store};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Store handle shared by every handler.
pub type SharedStore = Arc<dyn InventoryStore>;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, StoreError> {
    let store = open_store(config).await?;
    Ok(build_app_with_store(&config.jwt_secret, store))
}

/// Build the router over an already-opened store.
pub fn build_app_with_store(jwt_secret: &str, store: SharedStore) -> Router {
    let jwt = Arc::new(inventoryflow_auth::Hs256JwtValidator::new(jwt_secret));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(store))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let api = Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api", api).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

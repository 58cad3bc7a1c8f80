use axum::{
    Extension, Json, Router,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::app::{SharedStore, dto, errors};
use crate::context::OwnerContext;

pub fn router() -> Router {
    Router::new().route("/calculate", get(calculate))
}

/// Feasibility of the implicit product made of every item with a per-product requirement.
pub async fn calculate(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
) -> Response {
    match store.calculate_inventory(owner.owner_id()).await {
        Ok(f) => Json(dto::FeasibilityResponse::from(f)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

use axum::{Extension, Json, response::IntoResponse};

use crate::context::OwnerContext;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "inventoryflow-backend",
    }))
}

pub async fn whoami(Extension(owner): Extension<OwnerContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "ownerId": owner.owner_id().to_string(),
        "roles": owner.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
    }))
}

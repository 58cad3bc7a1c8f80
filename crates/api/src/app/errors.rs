use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use inventoryflow_build::BuildError;
use inventoryflow_core::DomainError;
use inventoryflow_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Build(e) => build_error_to_response(e),
        StoreError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "server error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        // A planned write broke its own guarantee.
        DomainError::InvariantViolation(msg) => {
            tracing::error!(error = %msg, "invariant violation");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "invariant_violation", "server error")
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

/// Build failures are client errors; the body carries `canBuild` where known.
pub fn build_error_to_response(err: BuildError) -> Response {
    let message = err.to_string();
    let (code, can_build) = match err {
        BuildError::InvalidQuantity => ("invalid_quantity", None),
        BuildError::EmptyBom => ("empty_bom", Some(0)),
        BuildError::InsufficientStock { can_build, .. } => ("insufficient_stock", Some(can_build)),
    };

    let body = match can_build {
        Some(can_build) => json!({ "error": code, "message": message, "canBuild": can_build }),
        None => json!({ "error": code, "message": message }),
    };
    (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
}

/// Malformed or mistyped JSON bodies are plain 400s.
pub fn rejection_to_response(rejection: JsonRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

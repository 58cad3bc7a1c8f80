use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use inventoryflow_core::ProductId;
use inventoryflow_infra::StoreError;
use inventoryflow_products::NewProduct;

use crate::app::routes::items::parse_item_id;
use crate::app::{SharedStore, dto, errors};
use crate::context::OwnerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product))
        .route("/:id/parts", get(get_parts).post(upsert_part))
        .route("/:id/parts/:item_id", delete(remove_part))
        .route("/:id/can-build", get(can_build))
        .route("/:id/build", post(build))
}

fn parse_product_id(raw: &str) -> Result<ProductId, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

pub async fn list_products(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
) -> Response {
    match store.list_products(owner.owner_id()).await {
        Ok(products) => Json(
            products
                .into_iter()
                .map(dto::ProductResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match store
        .create_product(owner.owner_id(), NewProduct::named(body.name))
        .await
    {
        Ok(product) => (StatusCode::CREATED, Json(dto::ProductResponse::from(product))).into_response(),
        Err(StoreError::Conflict(_)) => {
            errors::json_error(StatusCode::CONFLICT, "conflict", "Product already exists")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.get_product(owner.owner_id(), id).await {
        Ok(product) => Json(dto::ProductResponse::from(product)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_parts(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.can_build(owner.owner_id(), id).await {
        Ok(f) => Json(dto::PartsResponse::from(f)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn upsert_part(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpsertPartRequest>, JsonRejection>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };
    let spec = match body.into_spec() {
        Ok(spec) => spec,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.upsert_component(owner.owner_id(), id, spec).await {
        Ok(entry) => (StatusCode::CREATED, Json(dto::PartEntryResponse::from(entry))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn remove_part(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path((id, item_id)): Path<(String, String)>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let item_id = match parse_item_id(&item_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.remove_component(owner.owner_id(), id, item_id).await {
        Ok(()) => Json(dto::MessageResponse { message: "Part removed" }).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn can_build(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.can_build(owner.owner_id(), id).await {
        Ok(f) => Json(dto::FeasibilityResponse::from(f)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn build(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::BuildRequest>, JsonRejection>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let quantity = match body {
        Ok(Json(body)) => dto::parse_build_quantity(&body.quantity),
        Err(_) => Err(inventoryflow_build::BuildError::InvalidQuantity),
    };
    let quantity = match quantity {
        Ok(q) => q,
        Err(e) => return errors::build_error_to_response(e),
    };

    match store.commit_build(owner.owner_id(), id, quantity).await {
        Ok(receipt) => {
            tracing::info!(
                owner_id = %owner.owner_id(),
                product_id = %id,
                built = receipt.built,
                items = receipt.decrements.len(),
                "build completed"
            );
            Json(dto::BuildResponse {
                message: "Build completed",
                built: receipt.built,
            })
            .into_response()
        }
        Err(e) => {
            tracing::info!(owner_id = %owner.owner_id(), product_id = %id, quantity, error = %e, "build rejected");
            errors::store_error_to_response(e)
        }
    }
}

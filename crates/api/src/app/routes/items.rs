use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use inventoryflow_core::ItemId;

use crate::app::{SharedStore, dto, errors};
use crate::context::OwnerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

pub(crate) fn parse_item_id(raw: &str) -> Result<ItemId, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"))
}

pub async fn list_items(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
) -> Response {
    match store.list_items(owner.owner_id()).await {
        Ok(items) => {
            let items: Vec<dto::ItemResponse> = items.into_iter().map(Into::into).collect();
            let total = items.len();
            Json(dto::ItemListResponse { items, total }).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    body: Result<Json<dto::CreateItemRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match store.create_item(owner.owner_id(), body.into()).await {
        Ok(item) => (StatusCode::CREATED, Json(dto::ItemResponse::from(item))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.get_item(owner.owner_id(), id).await {
        Ok(item) => Json(dto::ItemResponse::from(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateItemRequest>, JsonRejection>,
) -> Response {
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match store.update_item(owner.owner_id(), id, body.into()).await {
        Ok(item) => Json(dto::ItemResponse::from(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(store): Extension<SharedStore>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match store.delete_item(owner.owner_id(), id).await {
        Ok(()) => Json(dto::MessageResponse { message: "Item deleted" }).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

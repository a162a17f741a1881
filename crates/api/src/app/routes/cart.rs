use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
};

use kidloop_core::ProductId;

use crate::app::services::{AppServices, shopping};
use crate::app::{dto, errors};
use crate::context::Principal;

pub fn router() -> Router {
    Router::new()
        .route("/", post(add).get(list))
        .route("/:product_id", delete(remove))
}

pub async fn add(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::AddItemRequest>,
) -> Response {
    match shopping::add_to_cart(&services, principal.user, body.product) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match shopping::list_cart(&services, principal.user) {
        Ok(items) => Json(serde_json::json!({ "items": items })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(product_id): Path<String>,
) -> Response {
    let product: ProductId = match dto::parse_id(&product_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match shopping::remove_from_cart(&services, principal.user, product) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

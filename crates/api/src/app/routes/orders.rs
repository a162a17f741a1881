use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};

use kidloop_core::OrderId;

use crate::app::services::{
    AppServices,
    orders::{self, PlaceOrder},
};
use crate::app::{dto, errors};
use crate::context::Principal;

pub fn router() -> Router {
    Router::new()
        .route("/", post(place).get(list_mine))
        .route("/:id", get(get_one))
        .route("/:id/status", patch(set_status))
}

pub async fn place(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> Response {
    let request = PlaceOrder {
        products: body.products,
        shipping_address: body.shipping_address,
        payment_status: body.payment_status,
        payment_id: body.payment_id,
        idempotency_key: body.idempotency_key,
    };

    match orders::place_order(&services, principal.user, request) {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match orders::customer_orders(&services, principal.user) {
        Ok(items) => Json(serde_json::json!({ "items": items })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id: OrderId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match orders::get_order(&services, &principal, id) {
        Ok(order) => Json(order).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::OrderStatusRequest>,
) -> Response {
    let id: OrderId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match orders::set_order_status(&services, &principal, id, body.status, body.delivery_boy) {
        Ok(order) => Json(order).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn admin_list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::OrderListQuery>,
) -> Response {
    let (filter, sort, page) = match query.into_parts() {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match orders::admin_orders(&services, &principal, filter, sort, page) {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn admin_details(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id: OrderId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match orders::admin_order_details(&services, &principal, id) {
        Ok(details) => Json(details).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

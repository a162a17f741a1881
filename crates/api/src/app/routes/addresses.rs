use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use kidloop_core::AddressId;
use kidloop_parties::{AddressPatch, NewAddress};

use crate::app::services::{AppServices, parties};
use crate::app::{dto, errors};
use crate::context::Principal;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).patch(update).delete(remove))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<NewAddress>,
) -> Response {
    match parties::create_address(&services, principal.user, body) {
        Ok(address) => (StatusCode::CREATED, Json(address)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match parties::list_addresses(&services, principal.user) {
        Ok(items) => Json(serde_json::json!({ "items": items })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id: AddressId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match parties::get_address(&services, &principal, id) {
        Ok(address) => Json(address).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<AddressPatch>,
) -> Response {
    let id: AddressId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match parties::update_address(&services, &principal, id, body) {
        Ok(address) => Json(address).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id: AddressId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match parties::delete_address(&services, &principal, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

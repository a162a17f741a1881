use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use kidloop_catalog::SellType;
use kidloop_core::{AddressId, DomainError, ProductId};

use crate::app::services::{
    AppServices,
    catalog::{self, ProductForm, ProductUpload},
};
use crate::app::{dto, errors};
use crate::context::Principal;

pub fn router() -> Router {
    Router::new()
        .route("/", axum::routing::post(create).get(list))
        .route("/unapproved", axum::routing::get(unapproved))
        .route("/:id", axum::routing::get(get_one))
        .route("/:id/status", axum::routing::patch(set_status))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    multipart: Multipart,
) -> Response {
    let (form, uploads) = match parse_product_form(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    match catalog::create_product(&services, principal.user, form, uploads) {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ProductListQuery>,
) -> Response {
    let (filter, sort, page) = match query.into_parts() {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match catalog::list_products(&services, filter, sort, page) {
        Ok((items, page)) => {
            Json(serde_json::json!({ "items": items, "page": page })).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn unapproved(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::PageQuery>,
) -> Response {
    let page = dto::page_request(query.page, query.limit);
    match catalog::unapproved_products(&services, &principal, page) {
        Ok((items, page)) => {
            Json(serde_json::json!({ "items": items, "page": page })).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match catalog::get_product(&services, id) {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::ProductStatusRequest>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match catalog::set_product_status(&services, &principal, id, body.status, body.pickup_assignee)
    {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Pull the product fields and image parts out of a multipart body.
async fn parse_product_form(
    mut multipart: Multipart,
) -> Result<(ProductForm, Vec<ProductUpload>), Response> {
    let bad = |msg: String| errors::domain_error_to_response(DomainError::validation(msg));

    let mut name = None;
    let mut description = None;
    let mut original_price = None;
    let mut current_price = None;
    let mut category = None;
    let mut age_group = None;
    let mut condition = None;
    let mut sell_type = None;
    let mut pickup_address = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "images" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| bad("image part needs a filename".to_string()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad(format!("failed to read image part: {e}")))?;
                uploads.push(ProductUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad(format!("failed to read field {other}: {e}")))?;
                match other {
                    "name" => name = Some(value),
                    "description" => description = Some(value),
                    "original_price" => {
                        original_price = Some(value.parse::<u64>().map_err(|_| {
                            bad("original_price must be a non-negative integer".to_string())
                        })?);
                    }
                    "current_price" => {
                        current_price = Some(value.parse::<u64>().map_err(|_| {
                            bad("current_price must be a non-negative integer".to_string())
                        })?);
                    }
                    "category" => category = Some(value),
                    "age_group" => age_group = Some(value),
                    "condition" => condition = Some(value),
                    "sell_type" => {
                        let parsed: SellType =
                            serde_json::from_value(serde_json::Value::String(value))
                                .map_err(|_| bad("unknown sell_type".to_string()))?;
                        sell_type = Some(parsed);
                    }
                    "pickup_address" => {
                        let parsed: AddressId =
                            value.parse().map_err(errors::domain_error_to_response)?;
                        pickup_address = Some(parsed);
                    }
                    _ => return Err(bad(format!("unexpected field: {other}"))),
                }
            }
        }
    }

    let require = |field: &str| bad(format!("{field} is required"));
    let form = ProductForm {
        name: name.ok_or_else(|| require("name"))?,
        description: description.unwrap_or_default(),
        original_price: original_price.ok_or_else(|| require("original_price"))?,
        current_price: current_price.ok_or_else(|| require("current_price"))?,
        category: category.ok_or_else(|| require("category"))?,
        age_group: age_group.ok_or_else(|| require("age_group"))?,
        condition: condition.ok_or_else(|| require("condition"))?,
        sell_type: sell_type.ok_or_else(|| require("sell_type"))?,
        pickup_address: pickup_address.ok_or_else(|| require("pickup_address"))?,
    };

    Ok((form, uploads))
}

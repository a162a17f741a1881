use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::{IntoResponse, Response},
};

use crate::app::services::{AppServices, parties};
use crate::app::{dto, errors};
use crate::context::Principal;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::UserListQuery>,
) -> Response {
    match parties::list_users(&services, &principal, query.role) {
        Ok(users) => {
            let items: Vec<_> = users.iter().map(dto::user_to_json).collect();
            Json(serde_json::json!({ "items": items })).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

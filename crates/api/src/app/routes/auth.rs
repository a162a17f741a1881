use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use kidloop_auth::Role;

use crate::app::services::{AppServices, parties};
use crate::app::{dto, errors};
use crate::context::Principal;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> Response {
    let role = body.role.unwrap_or(Role::Customer);
    match parties::register(&services, &body.name, &body.email, &body.password, role) {
        Ok((user, tokens)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "user": dto::user_to_json(&user),
                "tokens": tokens,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Response {
    match parties::login(&services, &body.email, &body.password) {
        Ok((user, tokens)) => Json(serde_json::json!({
            "user": dto::user_to_json(&user),
            "tokens": tokens,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> Response {
    match parties::change_password(
        &services,
        principal.user,
        &body.current_password,
        &body.new_password,
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

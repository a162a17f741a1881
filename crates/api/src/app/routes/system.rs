use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::Principal;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user": principal.user.to_string(),
        "email": principal.email,
        "role": principal.role.as_str(),
    }))
}

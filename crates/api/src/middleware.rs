use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use kidloop_auth::TokenCodec;

use crate::app::errors::json_error;
use crate::context::Principal;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenCodec>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(t) => t.to_string(),
        Err(resp) => return resp,
    };

    let claims = match state.tokens.verify(&token, Utc::now()) {
        Ok(c) => c,
        Err(_) => {
            return json_error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "invalid or expired token",
            );
        }
    };

    req.extensions_mut().insert(Principal {
        user: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let missing = || json_error(StatusCode::UNAUTHORIZED, "unauthorized", "missing bearer token");

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let token = header.strip_prefix("Bearer ").ok_or_else(missing)?.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}

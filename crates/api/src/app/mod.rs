//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services/`: collaborator construction and per-domain orchestration
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use kidloop_auth::{Hs256TokenCodec, TokenCodec};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String) -> Router {
    let tokens: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let services = Arc::new(services::build_services(tokens.clone()));
    let auth_state = middleware::AuthState { tokens };

    // Protected routes: bearer token required.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

use axum::{
    Router,
    routing::{get, post},
};

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod contacts;
pub mod orders;
pub mod products;
pub mod system;
pub mod users;
pub mod wishlist;

/// Routes reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/contact", post(contacts::create))
}

/// Routes behind the auth middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/auth/change-password", post(auth::change_password))
        .route("/users", get(users::list))
        .nest("/products", products::router())
        .nest("/order", orders::router())
        .route("/admin/orders", get(orders::admin_list))
        .route("/admin/orders/:id", get(orders::admin_details))
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/address", addresses::router())
        .nest("/admin/contacts", contacts::admin_router())
}

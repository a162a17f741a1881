use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use kidloop_auth::{JwtClaims, Role};
use kidloop_core::{ProductId, UserId};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = kidloop_api::app::build_app(jwt_secret.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, role: Role) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        email: "minted@example.com".to_string(),
        role,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

/// Register an account over HTTP; returns (access token, user id).
async fn register(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    email: &str,
    role: &str,
) -> (String, String) {
    let res = client
        .post(format!("{}/auth/register", base_url))
        .json(&json!({
            "name": name,
            "email": email,
            "password": "hunter2",
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED, "register {email}");

    let body: serde_json::Value = res.json().await.unwrap();
    (
        body["tokens"]["access_token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn create_address(client: &reqwest::Client, base_url: &str, token: &str) -> String {
    let res = client
        .post(format!("{}/address", base_url))
        .bearer_auth(token)
        .json(&json!({
            "full_name": "Asha Rao",
            "phone": "9999999999",
            "line1": "12 MG Road",
            "line2": null,
            "city": "Bengaluru",
            "state": "KA",
            "postal_code": "560001",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    pickup_address: &str,
) -> serde_json::Value {
    let image = reqwest::multipart::Part::bytes(b"png-bytes".to_vec())
        .file_name("image-1.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("name", name.to_string())
        .text("description", "Lightly used")
        .text("original_price", "1200")
        .text("current_price", "500")
        .text("category", "Toys")
        .text("age_group", "3-5")
        .text("condition", "Good")
        .text("sell_type", "Sell with us")
        .text("pickup_address", pickup_address.to_string())
        .part("images", image);

    let res = client
        .post(format!("{}/products", base_url))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn("test-secret").await;

    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/cart", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let srv = TestServer::spawn("test-secret").await;

    let token = mint_jwt("other-secret", Role::Admin);
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_whoami() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (_, user_id) = register(&client, &srv.base_url, "Asha", "asha@example.com", "Seller").await;

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "asha@example.com", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let token = body["tokens"]["access_token"].as_str().unwrap();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"].as_str().unwrap(), user_id);
    assert_eq!(body["role"].as_str().unwrap(), "Seller");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "Asha", "dup@example.com", "Customer").await;

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "name": "Also Asha",
            "email": "dup@example.com",
            "password": "hunter2",
            "role": "Customer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_with_wrong_password_is_forbidden() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "Asha", "asha@example.com", "Customer").await;

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "asha@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_creation_listing_and_search() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (seller, _) = register(&client, &srv.base_url, "Asha", "s@example.com", "Seller").await;
    let address = create_address(&client, &srv.base_url, &seller).await;

    let train = create_product(&client, &srv.base_url, &seller, "Wooden train", &address).await;
    create_product(&client, &srv.base_url, &seller, "Raincoat", &address).await;

    assert_eq!(train["status"].as_str().unwrap(), "Pending");
    assert_eq!(train["current_price"].as_u64().unwrap(), 500);
    assert_eq!(train["images"].as_array().unwrap().len(), 1);

    let res = client
        .get(format!("{}/products?search=train", srv.base_url))
        .bearer_auth(&seller)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["page"]["total_items"].as_u64().unwrap(), 1);

    let res = client
        .get(format!("{}/products/{}", srv.base_url, train["id"].as_str().unwrap()))
        .bearer_auth(&seller)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_status_workflow_is_role_gated() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (seller, _) = register(&client, &srv.base_url, "Asha", "s@example.com", "Seller").await;
    let (admin, _) = register(&client, &srv.base_url, "Root", "a@example.com", "Admin").await;
    let (_, boy_id) = register(&client, &srv.base_url, "Dev", "d@example.com", "DeliveryBoy").await;

    let address = create_address(&client, &srv.base_url, &seller).await;
    let product = create_product(&client, &srv.base_url, &seller, "Wooden train", &address).await;
    let product_id = product["id"].as_str().unwrap();

    // The seller may not approve their own product.
    let res = client
        .patch(format!("{}/products/{}/status", srv.base_url, product_id))
        .bearer_auth(&seller)
        .json(&json!({ "status": "Ready to pick", "pickup_assignee": boy_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The assignee must hold the DeliveryBoy role.
    let res = client
        .patch(format!("{}/products/{}/status", srv.base_url, product_id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "Ready to pick", "pickup_assignee": product["seller"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Skipping a step is an invariant violation.
    let res = client
        .patch(format!("{}/products/{}/status", srv.base_url, product_id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "Completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .patch(format!("{}/products/{}/status", srv.base_url, product_id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "Ready to pick", "pickup_assignee": boy_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"].as_str().unwrap(), "Ready to pick");
    assert_eq!(body["pickup_assignee"].as_str().unwrap(), boy_id);
}

#[tokio::test]
async fn order_placement_reserves_products_and_clears_the_cart() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (seller, _) = register(&client, &srv.base_url, "Asha", "s@example.com", "Seller").await;
    let (buyer, _) = register(&client, &srv.base_url, "Mina", "b@example.com", "Customer").await;

    let pickup = create_address(&client, &srv.base_url, &seller).await;
    let shipping = create_address(&client, &srv.base_url, &buyer).await;
    let product = create_product(&client, &srv.base_url, &seller, "Wooden train", &pickup).await;
    let product_id = product["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/cart", srv.base_url))
        .bearer_auth(&buyer)
        .json(&json!({ "product": product_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let place = json!({
        "products": [product_id],
        "shipping_address": shipping,
        "payment_status": "Paid",
        "payment_id": "pay-1",
        "idempotency_key": "order-key-1",
    });
    let res = client
        .post(format!("{}/order", srv.base_url))
        .bearer_auth(&buyer)
        .json(&place)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["amount"].as_u64().unwrap(), 500);
    assert_eq!(order["status"].as_str().unwrap(), "Pending");

    // The product is now sold out and the cart row is gone.
    let res = client
        .get(format!("{}/products/{}", srv.base_url, product_id))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"].as_str().unwrap(), "Sold out");

    let res = client
        .get(format!("{}/cart", srv.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    // A replay under the same idempotency key returns the original order.
    let res = client
        .post(format!("{}/order", srv.base_url))
        .bearer_auth(&buyer)
        .json(&place)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let replay: serde_json::Value = res.json().await.unwrap();
    assert_eq!(replay["id"], order["id"]);

    // A fresh attempt to buy the sold product conflicts.
    let res = client
        .post(format!("{}/order", srv.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "products": [product_id],
            "shipping_address": shipping,
            "payment_status": "Paid",
            "payment_id": "pay-2",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn conflicting_placement_restores_earlier_reservations() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (seller, _) = register(&client, &srv.base_url, "Asha", "s@example.com", "Seller").await;
    let (buyer, _) = register(&client, &srv.base_url, "Mina", "b@example.com", "Customer").await;

    let pickup = create_address(&client, &srv.base_url, &seller).await;
    let shipping = create_address(&client, &srv.base_url, &buyer).await;
    let train = create_product(&client, &srv.base_url, &seller, "Wooden train", &pickup).await;
    let coat = create_product(&client, &srv.base_url, &seller, "Raincoat", &pickup).await;

    // Sell the raincoat on its own first.
    let res = client
        .post(format!("{}/order", srv.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "products": [coat["id"]],
            "shipping_address": shipping,
            "payment_status": "Paid",
            "payment_id": "pay-1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // A placement for [available, sold-out] conflicts on the second product.
    let res = client
        .post(format!("{}/order", srv.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "products": [train["id"], coat["id"]],
            "shipping_address": shipping,
            "payment_status": "Paid",
            "payment_id": "pay-2",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The train was reserved before the conflict and must be back on sale.
    let res = client
        .get(format!(
            "{}/products/{}",
            srv.base_url,
            train["id"].as_str().unwrap()
        ))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"].as_str().unwrap(), "Pending");
}

#[tokio::test]
async fn duplicate_cart_add_conflicts_and_absent_remove_is_not_found() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (seller, _) = register(&client, &srv.base_url, "Asha", "s@example.com", "Seller").await;
    let (buyer, _) = register(&client, &srv.base_url, "Mina", "b@example.com", "Customer").await;

    let pickup = create_address(&client, &srv.base_url, &seller).await;
    let product = create_product(&client, &srv.base_url, &seller, "Wooden train", &pickup).await;
    let product_id = product["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/cart", srv.base_url))
        .bearer_auth(&buyer)
        .json(&json!({ "product": product_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // A second add of the same pair conflicts and leaves a single row.
    let res = client
        .post(format!("{}/cart", srv.base_url))
        .bearer_auth(&buyer)
        .json(&json!({ "product": product_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(format!("{}/cart", srv.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // Removing a pair that was never added is not found.
    let res = client
        .delete(format!("{}/cart/{}", srv.base_url, ProductId::new()))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_order_listing_filters_by_status() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (seller, _) = register(&client, &srv.base_url, "Asha", "s@example.com", "Seller").await;
    let (buyer, _) = register(&client, &srv.base_url, "Mina", "b@example.com", "Customer").await;
    let (admin, _) = register(&client, &srv.base_url, "Root", "a@example.com", "Admin").await;

    let pickup = create_address(&client, &srv.base_url, &seller).await;
    let shipping = create_address(&client, &srv.base_url, &buyer).await;
    let product = create_product(&client, &srv.base_url, &seller, "Wooden train", &pickup).await;

    let res = client
        .post(format!("{}/order", srv.base_url))
        .bearer_auth(&buyer)
        .json(&json!({
            "products": [product["id"]],
            "shipping_address": shipping,
            "payment_status": "Paid",
            "payment_id": "pay-1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Non-admin is rejected.
    let res = client
        .get(format!("{}/admin/orders", srv.base_url))
        .bearer_auth(&buyer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/admin/orders?status=Pending", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_amount"].as_u64().unwrap(), 500);
    assert_eq!(
        body["items"][0]["customer_email"].as_str().unwrap(),
        "b@example.com"
    );

    let res = client
        .get(format!("{}/admin/orders?status=Shipped", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn address_access_is_scoped_to_the_owner() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (owner, _) = register(&client, &srv.base_url, "Asha", "o@example.com", "Customer").await;
    let (other, _) = register(&client, &srv.base_url, "Mina", "x@example.com", "Customer").await;

    let address = create_address(&client, &srv.base_url, &owner).await;

    let res = client
        .get(format!("{}/address/{}", srv.base_url, address))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .patch(format!("{}/address/{}", srv.base_url, address))
        .bearer_auth(&owner)
        .json(&json!({ "city": "Mysuru" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["city"].as_str().unwrap(), "Mysuru");
}

#[tokio::test]
async fn contact_workflow_end_to_end() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (admin, _) = register(&client, &srv.base_url, "Root", "a@example.com", "Admin").await;

    // Public intake, no token.
    let res = client
        .post(format!("{}/contact", srv.base_url))
        .json(&json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "phone": "9999999999",
            "subject": "Pickup delay",
            "message": "The pickup never arrived.",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let contact: serde_json::Value = res.json().await.unwrap();
    let contact_id = contact["id"].as_str().unwrap();
    assert_eq!(contact["status"].as_str().unwrap(), "pending");

    let res = client
        .post(format!(
            "{}/admin/contacts/{}/respond",
            srv.base_url, contact_id
        ))
        .bearer_auth(&admin)
        .json(&json!({ "response": "We re-scheduled the pickup." }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"].as_str().unwrap(), "resolved");
    assert_eq!(body["is_read"].as_bool().unwrap(), true);

    // Soft delete closes the inquiry; a closed inquiry rejects transitions.
    let res = client
        .delete(format!("{}/admin/contacts/{}", srv.base_url, contact_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .patch(format!(
            "{}/admin/contacts/{}/status",
            srv.base_url, contact_id
        ))
        .bearer_auth(&admin)
        .json(&json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .get(format!("{}/admin/contacts/stats", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["total"].as_u64().unwrap(), 1);
    assert_eq!(stats["closed"].as_u64().unwrap(), 1);
}

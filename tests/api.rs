use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::auth::TokenKeys;
use storefront_api::http::{router, AppState};
use storefront_api::services::users::SignupPolicy;
use storefront_api::store::Store;

fn app() -> Router {
    let tokens = Arc::new(TokenKeys::new(b"integration-secret", chrono::Duration::days(30)));
    router(AppState { store: Store::memory(), tokens, signup: SignupPolicy::default() })
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

async fn register(app: &Router, name: &str, role: &str) -> String {
    let body = json!({ "username": name, "email": format!("{name}@example.com"), "password": "password123", "role": role });
    let (status, json) = call(app, Method::POST, "/api/user/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert!(json.get("password").is_none() && json.get("passwordHash").is_none());
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, json) = call(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_accounts() {
    let app = app();
    let token = register(&app, "ada", "shopper").await;

    let again = json!({ "username": "ada", "email": "ada@example.com", "password": "password123" });
    let (status, json) = call(&app, Method::POST, "/api/user/register", None, Some(again)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());

    let wrong_password = json!({ "email": "ada@example.com", "password": "not-the-password" });
    let unknown_email = json!({ "email": "nobody@example.com", "password": "not-the-password" });
    let wrong = call(&app, Method::POST, "/api/user/login", None, Some(wrong_password)).await;
    let unknown = call(&app, Method::POST, "/api/user/login", None, Some(unknown_email)).await;
    assert_eq!(wrong.0, StatusCode::BAD_REQUEST);
    assert_eq!(wrong, unknown);

    let (status, profile) = call(&app, Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "ada");
    assert_eq!(profile["role"], "shopper");

    let (status, _) = call(&app, Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::DELETE, "/api/user/delete", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejects_bad_requests() {
    let app = app();
    let (status, _) = call(&app, Method::GET, "/api/cart/all", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/api/cart/all", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = call(&app, Method::GET, "/api/categories/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/user/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_scenario() {
    let app = app();
    let seller = register(&app, "seller", "seller").await;
    let ada = register(&app, "ada", "shopper").await;
    let admin = register(&app, "root", "admin").await;

    let negative = json!({ "name": "Broken", "price": -1, "stock": 1, "categoryName": "Books" });
    let (status, json) = call(&app, Method::POST, "/api/products", Some(&seller), Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["errors"]["price"].is_array());

    let free = json!({ "name": "Bookmark", "price": 0, "stock": 100, "categoryName": "Books" });
    let (status, _) = call(&app, Method::POST, "/api/products", Some(&seller), Some(free)).await;
    assert_eq!(status, StatusCode::CREATED);

    let dune = json!({ "name": "Dune", "price": 12.5, "stock": 5, "categoryName": "Books" });
    let (status, _) = call(&app, Method::POST, "/api/products", Some(&ada), Some(dune.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, product) = call(&app, Method::POST, "/api/products", Some(&seller), Some(dune)).await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().unwrap().to_string();
    let category_id = product["categoryId"].as_str().unwrap().to_string();

    let (status, listed) = call(&app, Method::GET, &format!("/api/products/category/{category_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    // cart: 3 of 5 fits, 10 does not, the line keeps 3
    let (status, line) = call(&app, Method::POST, "/api/cart/add", Some(&ada), Some(json!({ "productId": product_id, "quantity": 3 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let line_id = line["id"].as_str().unwrap().to_string();

    let (status, json) = call(&app, Method::PUT, &format!("/api/cart/{line_id}"), Some(&ada), Some(json!({ "quantity": 10 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Quantity exceeds stock");

    let (status, cart) = call(&app, Method::GET, "/api/cart/all", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart[0]["quantity"], 3);
    assert_eq!(cart[0]["product"]["name"], "Dune");

    let (status, line) = call(&app, Method::POST, "/api/cart/add", Some(&ada), Some(json!({ "productId": product_id, "quantity": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["id"].as_str().unwrap(), line_id);

    let missing = format!("/api/cart/{}", Uuid::now_v7());
    let (status, json) = call(&app, Method::DELETE, &missing, Some(&ada), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Cart item not found");

    // order 3 and walk the lifecycle
    let (status, order) = call(&app, Method::POST, "/api/orders", Some(&ada), Some(json!({ "productId": product_id, "quantity": 3 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["totalAmount"].as_f64(), Some(37.5));
    let order_uri = format!("/api/orders/{}", order["id"].as_str().unwrap());

    let (_, product) = call(&app, Method::GET, &format!("/api/products/{product_id}"), None, None).await;
    assert_eq!(product["stock"], 2);

    let (status, _) = call(&app, Method::POST, "/api/orders", Some(&ada), Some(json!({ "productId": product_id, "quantity": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::PUT, &order_uri, Some(&ada), Some(json!({ "status": "shipped" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::PUT, &order_uri, Some(&admin), Some(json!({ "status": "delivered" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    for next in ["shipped", "delivered"] {
        let (status, order) = call(&app, Method::PUT, &order_uri, Some(&admin), Some(json!({ "status": next }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], next);
    }
    let (status, _) = call(&app, Method::PUT, &order_uri, Some(&admin), Some(json!({ "status": "pending" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, Method::GET, &order_uri, Some(&seller), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, orders) = call(&app, Method::GET, "/api/orders", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders[0]["product"]["name"], "Dune");

    // product with an order cannot go, its category cannot either
    let (status, _) = call(&app, Method::DELETE, &format!("/api/products/{product_id}"), Some(&seller), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = call(&app, Method::DELETE, &format!("/api/categories/{category_id}"), None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, payment) = call(&app, Method::POST, "/api/payments", Some(&ada), Some(json!({ "amount": 37.5, "method": "card" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "pending");
    let payment_uri = format!("/api/payments/{}", payment["id"].as_str().unwrap());
    let (status, payment) = call(&app, Method::PUT, &payment_uri, Some(&ada), Some(json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["method"], "card");
    let (status, _) = call(&app, Method::GET, &payment_uri, Some(&seller), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_pending_order_restocks() {
    let app = app();
    let seller = register(&app, "seller", "seller").await;
    let ada = register(&app, "ada", "shopper").await;
    let lamp = json!({ "name": "Lamp", "price": 20, "stock": 4, "categoryName": "Home" });
    let (_, product) = call(&app, Method::POST, "/api/products", Some(&seller), Some(lamp)).await;
    let product_uri = format!("/api/products/{}", product["id"].as_str().unwrap());

    let (status, order) = call(&app, Method::POST, "/api/orders", Some(&ada), Some(json!({ "productId": product["id"], "quantity": 4 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, product) = call(&app, Method::GET, &product_uri, None, None).await;
    assert_eq!(product["stock"], 0);

    let order_uri = format!("/api/orders/{}", order["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::DELETE, &order_uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, product) = call(&app, Method::GET, &product_uri, None, None).await;
    assert_eq!(product["stock"], 4);

    let too_dear = json!({ "name": "Yacht", "price": 1e10, "stock": 1, "categoryName": "Home" });
    let (status, json) = call(&app, Method::POST, "/api/products", Some(&seller), Some(too_dear)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["errors"]["price"].is_array());
}

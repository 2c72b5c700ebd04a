//! HTTP surface: routes, extractors and error responses.

mod auth;
mod cart;
mod catalog;
mod error;
mod orders;
mod payments;
mod users;

pub use auth::AuthUser;

use axum::extract::{FromRequest, FromRequestParts};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenKeys;
use crate::services::users::SignupPolicy;
use crate::store::{Page, Store};
use crate::ShopError;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: Arc<TokenKeys>,
    pub signup: SignupPolicy,
}

/// JSON body whose parse failures surface as 400 validation errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ShopError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ShopError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ShopError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Body for operations with nothing else to return.
#[derive(Serialize)]
pub struct Message {
    message: &'static str,
}

pub fn message(message: &'static str) -> Json<Message> {
    Json(Message { message })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-api"})) }))
        .route("/api/user/register", post(users::register))
        .route("/api/user/login", post(users::login))
        .route("/api/user/profile", get(users::profile))
        .route("/api/user/update", put(users::update_profile))
        .route("/api/user/delete", axum::routing::delete(users::delete_account))
        .route("/api/users", get(users::list_users))
        .route("/api/products", get(catalog::list_products).post(catalog::create_product))
        .route("/api/products/:id", get(catalog::get_product).put(catalog::update_product).delete(catalog::delete_product))
        .route("/api/products/category/:category_id", get(catalog::products_by_category))
        .route("/api/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/api/categories/:id", get(catalog::get_category).put(catalog::update_category).delete(catalog::delete_category))
        .route("/api/cart/add", post(cart::add))
        .route("/api/cart/all", get(cart::all))
        .route("/api/cart/:id", put(cart::update).delete(cart::remove))
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/:id", get(orders::get_one).put(orders::update_status).delete(orders::remove))
        .route("/api/payments", get(payments::list).post(payments::create))
        .route("/api/payments/:id", get(payments::get_one).put(payments::update).delete(payments::remove))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{message, ApiJson, ApiPath, ApiQuery, AppState, AuthUser, Message, PageQuery};
use crate::services::catalog::{self, CategoryInput, CategoryUpdate, ProductInput, ProductUpdate};
use crate::store::{Page, ProductFilter};
use crate::{Category, Product, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    page: Option<u32>,
    limit: Option<u32>,
    category_id: Option<Uuid>,
}

pub async fn list_products(State(s): State<AppState>, ApiQuery(q): ApiQuery<ProductQuery>) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter { category_id: q.category_id };
    Ok(Json(catalog::list_products(&s.store, filter, Page::new(q.page, q.limit)).await?))
}

pub async fn products_by_category(
    State(s): State<AppState>,
    ApiPath(category_id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<PageQuery>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog::list_products_by_category(&s.store, category_id, q.page()).await?))
}

pub async fn get_product(State(s): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Product>> {
    Ok(Json(catalog::get_product(&s.store, id).await?))
}

pub async fn create_product(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = catalog::create_product(&s.store, &user, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProductUpdate>,
) -> Result<Json<Product>> {
    Ok(Json(catalog::update_product(&s.store, &user, id, input).await?))
}

pub async fn delete_product(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Message>> {
    catalog::delete_product(&s.store, &user, id).await?;
    Ok(message("Product removed"))
}

pub async fn list_categories(State(s): State<AppState>, ApiQuery(q): ApiQuery<PageQuery>) -> Result<Json<Vec<Category>>> {
    Ok(Json(catalog::list_categories(&s.store, q.page()).await?))
}

pub async fn get_category(State(s): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Category>> {
    Ok(Json(catalog::get_category(&s.store, id).await?))
}

pub async fn create_category(
    State(s): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = catalog::create_category(&s.store, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(s): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CategoryUpdate>,
) -> Result<Json<Category>> {
    Ok(Json(catalog::update_category(&s.store, id, input).await?))
}

pub async fn delete_category(State(s): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Message>> {
    catalog::delete_category(&s.store, id).await?;
    Ok(message("Category deleted successfully"))
}

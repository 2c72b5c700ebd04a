use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::{message, ApiJson, ApiPath, AppState, AuthUser, Message};
use crate::services::cart::{self, CartAdd, CartQuantity};
use crate::{CartItem, CartLine, Result};

/// 201 when the line is new, 200 when an existing line's quantity was replaced.
pub async fn add(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<CartAdd>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let (item, created) = cart::add_to_cart(&s.store, user.id, input).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(item)))
}

pub async fn all(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<CartLine>>> {
    Ok(Json(cart::get_cart(&s.store, user.id).await?))
}

pub async fn update(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CartQuantity>,
) -> Result<Json<CartItem>> {
    Ok(Json(cart::update_cart_item(&s.store, user.id, id, input).await?))
}

pub async fn remove(State(s): State<AppState>, AuthUser(user): AuthUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Message>> {
    cart::remove_cart_item(&s.store, user.id, id).await?;
    Ok(message("Cart item removed successfully"))
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::{message, ApiJson, ApiPath, ApiQuery, AppState, AuthUser, Message, PageQuery};
use crate::services::orders::{self, OrderInput, StatusChange};
use crate::{Order, OrderDetails, Result};

pub async fn create(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = orders::create_order(&s.store, user.id, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(q): ApiQuery<PageQuery>,
) -> Result<Json<Vec<OrderDetails>>> {
    Ok(Json(orders::list_orders(&s.store, user.id, q.page()).await?))
}

pub async fn get_one(State(s): State<AppState>, AuthUser(user): AuthUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<OrderDetails>> {
    Ok(Json(orders::get_order(&s.store, &user, id).await?))
}

pub async fn update_status(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<StatusChange>,
) -> Result<Json<Order>> {
    Ok(Json(orders::update_order_status(&s.store, &user, id, input).await?))
}

pub async fn remove(State(s): State<AppState>, AuthUser(user): AuthUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Message>> {
    orders::delete_order(&s.store, &user, id).await?;
    Ok(message("Order deleted successfully"))
}

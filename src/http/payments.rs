use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::{message, ApiJson, ApiPath, ApiQuery, AppState, AuthUser, Message, PageQuery};
use crate::services::payments::{self, PaymentInput, PaymentUpdate};
use crate::{Payment, Result};

pub async fn create(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<PaymentInput>,
) -> Result<(StatusCode, Json<Payment>)> {
    let payment = payments::create_payment(&s.store, user.id, input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn list(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(q): ApiQuery<PageQuery>,
) -> Result<Json<Vec<Payment>>> {
    Ok(Json(payments::list_payments(&s.store, user.id, q.page()).await?))
}

pub async fn get_one(State(s): State<AppState>, AuthUser(user): AuthUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Payment>> {
    Ok(Json(payments::get_payment(&s.store, user.id, id).await?))
}

pub async fn update(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<PaymentUpdate>,
) -> Result<Json<Payment>> {
    Ok(Json(payments::update_payment(&s.store, user.id, id, input).await?))
}

pub async fn remove(State(s): State<AppState>, AuthUser(user): AuthUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Message>> {
    payments::delete_payment(&s.store, user.id, id).await?;
    Ok(message("Payment deleted successfully"))
}

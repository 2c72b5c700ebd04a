use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::{message, ApiJson, ApiQuery, AppState, AuthUser, Message, PageQuery};
use crate::services::users::{self, Credentials, ProfileUpdate, Registration, Session};
use crate::{Result, User};

pub async fn register(State(s): State<AppState>, ApiJson(input): ApiJson<Registration>) -> Result<(StatusCode, Json<Session>)> {
    let session = users::register(&s.store, &s.tokens, s.signup, input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(State(s): State<AppState>, ApiJson(input): ApiJson<Credentials>) -> Result<Json<Session>> {
    Ok(Json(users::login(&s.store, &s.tokens, input).await?))
}

pub async fn profile(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<User>> {
    Ok(Json(users::profile(&s.store, user.id).await?))
}

pub async fn update_profile(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<ProfileUpdate>,
) -> Result<Json<User>> {
    Ok(Json(users::update_profile(&s.store, user.id, input).await?))
}

pub async fn delete_account(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Message>> {
    users::delete_account(&s.store, user.id).await?;
    Ok(message("User deleted successfully"))
}

pub async fn list_users(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(q): ApiQuery<PageQuery>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(users::list_users(&s.store, &user, q.page()).await?))
}

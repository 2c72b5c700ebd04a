use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::AppState;
use crate::{ShopError, User};

/// The caller behind a valid bearer token, loaded fresh from the store so a
/// deleted account or changed role takes effect immediately.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ShopError::Unauthorized)?;
        let user_id = state.tokens.verify(token)?;
        let user = state.store.users.get(user_id).await?.ok_or(ShopError::Unauthorized)?;
        Ok(Self(user))
    }
}

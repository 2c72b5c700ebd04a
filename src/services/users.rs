use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{self, TokenKeys};
use crate::domain::aggregates::normalize_email;
use crate::store::{NewUser, Page, Store, UserChanges};
use crate::{Result, Role, ShopError, User};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    #[validate(
        custom(function = "crate::services::not_blank", message = "Username is required"),
        length(max = 50, message = "Username must be at most 50 characters")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    #[validate(custom(function = "crate::services::not_blank", message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile fields a user may change about themselves. Role is not among them.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(
        custom(function = "crate::services::not_blank", message = "Username must not be blank"),
        length(max = 50, message = "Username must be at most 50 characters")
    )]
    pub username: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Whether sign-up may ask for the `admin` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignupPolicy {
    pub allow_admin: bool,
}

impl Default for SignupPolicy {
    fn default() -> Self {
        Self { allow_admin: true }
    }
}

/// Public profile plus a freshly issued bearer token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

pub async fn register(store: &Store, tokens: &TokenKeys, policy: SignupPolicy, mut input: Registration) -> Result<Session> {
    input.email = normalize_email(&input.email);
    input.validate()?;
    let role = input.role.unwrap_or_default();
    if role.is_admin() && !policy.allow_admin {
        return Err(ShopError::Forbidden);
    }

    let password_hash = auth::hash_password(input.password).await?;
    let user = store
        .users
        .insert(NewUser {
            username: input.username.trim().to_string(),
            email: input.email,
            password_hash,
            role,
        })
        .await?;
    if user.role.is_admin() {
        warn!(user_id = %user.id, username = %user.username, "admin account self-registered");
    } else {
        info!(user_id = %user.id, role = ?user.role, "user registered");
    }

    let token = tokens.issue(user.id)?;
    Ok(Session { user, token })
}

/// Unknown email and wrong password fail identically.
pub async fn login(store: &Store, tokens: &TokenKeys, input: Credentials) -> Result<Session> {
    input.validate()?;

    let user = store.users.find_by_email(&normalize_email(&input.email)).await?;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let verified = auth::verify_password(input.password, stored).await?;
    match user {
        Some(user) if verified => {
            let token = tokens.issue(user.id)?;
            Ok(Session { user, token })
        }
        _ => Err(ShopError::InvalidCredentials),
    }
}

pub async fn profile(store: &Store, user_id: Uuid) -> Result<User> {
    store.users.get(user_id).await?.ok_or(ShopError::NotFound("User"))
}

pub async fn update_profile(store: &Store, user_id: Uuid, mut input: ProfileUpdate) -> Result<User> {
    input.email = input.email.map(|e| normalize_email(&e));
    input.validate()?;

    let password_hash = match input.password {
        Some(password) => Some(auth::hash_password(password).await?),
        None => None,
    };
    let changes = UserChanges {
        username: input.username.map(|u| u.trim().to_string()),
        email: input.email,
        password_hash,
    };
    store.users.update(user_id, changes).await?.ok_or(ShopError::NotFound("User"))
}

pub async fn delete_account(store: &Store, user_id: Uuid) -> Result<()> {
    if !store.users.delete(user_id).await? {
        return Err(ShopError::NotFound("User"));
    }
    info!(%user_id, "account deleted");
    Ok(())
}

pub async fn list_users(store: &Store, caller: &User, page: Page) -> Result<Vec<User>> {
    if !caller.role.is_admin() {
        return Err(ShopError::Forbidden);
    }
    Ok(store.users.list(page).await?)
}

//! Password hashing and bearer tokens.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::{Result, ShopError};

/// Hashes with Argon2id and a fresh salt, off the async workers.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(ShopError::internal)?
}

fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(ShopError::internal)
}

/// Checks `password` against a stored hash. With no hash (unknown account)
/// a throwaway hash is verified instead so both paths cost the same.
pub async fn verify_password(password: String, stored: Option<String>) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let known = stored.is_some();
        let hash = stored.unwrap_or_else(|| dummy_hash().to_string());
        let matches = PasswordHash::new(&hash)
            .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false);
        known && matches
    })
    .await
    .map_err(ShopError::internal)
}

fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_blocking("storefront-dummy-password").unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// HS256 signing and verification keys plus the token lifetime.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims { sub: user_id, iat: now.timestamp(), exp: (now + self.ttl).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(ShopError::internal)
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims.sub)
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected bearer token");
                ShopError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("correct horse".into()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse".into(), Some(hash.clone())).await.unwrap());
        assert!(!verify_password("wrong horse".into(), Some(hash)).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_account_never_verifies() {
        assert!(!verify_password("storefront-dummy-password".into(), None).await.unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let keys = TokenKeys::new(b"secret", Duration::days(30));
        let id = Uuid::now_v7();
        let token = keys.issue(id).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_token_rejections() {
        let keys = TokenKeys::new(b"secret", Duration::days(30));
        let token = keys.issue(Uuid::now_v7()).unwrap();
        let other = TokenKeys::new(b"other-secret", Duration::days(30));
        assert!(matches!(other.verify(&token), Err(ShopError::Unauthorized)));

        let expired = TokenKeys::new(b"secret", Duration::minutes(-10)).issue(Uuid::now_v7()).unwrap();
        assert!(matches!(keys.verify(&expired), Err(ShopError::Unauthorized)));
        assert!(matches!(keys.verify("not-a-token"), Err(ShopError::Unauthorized)));
    }
}

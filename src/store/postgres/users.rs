use async_trait::async_trait;
use uuid::Uuid;

use super::{map_err, PgStore};
use crate::store::{NewUser, Page, StoreResult, UserChanges, UserStore};
use crate::User;

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>("INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(&user.username).bind(&user.email).bind(&user.password_hash).bind(user.role)
            .fetch_one(&self.pool).await.map_err(map_err)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn list(&self, page: Page) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2")
            .bind(page.size() as i64).bind(page.offset() as i64).fetch_all(&self.pool).await.map_err(map_err)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>("UPDATE users SET username = COALESCE($2, username), email = COALESCE($3, email), password_hash = COALESCE($4, password_hash), updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id).bind(&changes.username).bind(&changes.email).bind(&changes.password_hash)
            .fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        // carts, orders and payments go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await.map_err(map_err)?;
        Ok(result.rows_affected() > 0)
    }
}

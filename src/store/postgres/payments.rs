use async_trait::async_trait;
use uuid::Uuid;

use super::{map_err, PgStore};
use crate::store::{NewPayment, Page, PaymentChanges, PaymentStore, StoreResult};
use crate::Payment;

#[async_trait]
impl PaymentStore for PgStore {
    async fn insert(&self, payment: NewPayment) -> StoreResult<Payment> {
        sqlx::query_as::<_, Payment>("INSERT INTO payments (id, user_id, amount, method, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(payment.user_id).bind(payment.amount).bind(&payment.method).bind(payment.status)
            .fetch_one(&self.pool).await.map_err(map_err)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<Payment>> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 AND user_id = $2")
            .bind(id).bind(user_id).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<Payment>> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3")
            .bind(user_id).bind(page.size() as i64).bind(page.offset() as i64)
            .fetch_all(&self.pool).await.map_err(map_err)
    }

    async fn update(&self, id: Uuid, user_id: Uuid, changes: PaymentChanges) -> StoreResult<Option<Payment>> {
        sqlx::query_as::<_, Payment>("UPDATE payments SET amount = COALESCE($3, amount), method = COALESCE($4, method), status = COALESCE($5, status), updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING *")
            .bind(id).bind(user_id).bind(changes.amount).bind(&changes.method).bind(changes.status)
            .fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND user_id = $2")
            .bind(id).bind(user_id).execute(&self.pool).await.map_err(map_err)?;
        Ok(result.rows_affected() > 0)
    }
}

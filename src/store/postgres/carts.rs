use async_trait::async_trait;
use uuid::Uuid;

use super::{map_err, PgStore};
use crate::store::{CartStore, StoreResult};
use crate::{CartItem, CartLine};

#[derive(sqlx::FromRow)]
struct UpsertedRow {
    #[sqlx(flatten)]
    item: CartItem,
    inserted: bool,
}

#[async_trait]
impl CartStore for PgStore {
    async fn upsert(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<(CartItem, bool)> {
        // xmax is zero only for a freshly inserted tuple
        let row = sqlx::query_as::<_, UpsertedRow>("INSERT INTO carts (id, user_id, product_id, quantity, created_at, updated_at) VALUES ($1, $2, $3, $4, NOW(), NOW()) ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW() RETURNING *, (xmax = 0) AS inserted")
            .bind(Uuid::now_v7()).bind(user_id).bind(product_id).bind(quantity)
            .fetch_one(&self.pool).await.map_err(map_err)?;
        Ok((row.item, row.inserted))
    }

    async fn lines(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
        let items = sqlx::query_as::<_, CartItem>("SELECT * FROM carts WHERE user_id = $1 ORDER BY created_at, id")
            .bind(user_id).fetch_all(&self.pool).await.map_err(map_err)?;
        let mut products = self.products_by_id(items.iter().map(|i| i.product_id).collect()).await?;
        // (user_id, product_id) is unique, so each product backs exactly one line
        Ok(items.into_iter().filter_map(|item| {
            let product = products.remove(&item.product_id)?;
            Some(CartLine { item, product })
        }).collect())
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<CartItem>> {
        sqlx::query_as::<_, CartItem>("SELECT * FROM carts WHERE id = $1 AND user_id = $2")
            .bind(id).bind(user_id).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn set_quantity(&self, id: Uuid, user_id: Uuid, quantity: i32) -> StoreResult<Option<CartItem>> {
        sqlx::query_as::<_, CartItem>("UPDATE carts SET quantity = $3, updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING *")
            .bind(id).bind(user_id).bind(quantity).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE id = $1 AND user_id = $2")
            .bind(id).bind(user_id).execute(&self.pool).await.map_err(map_err)?;
        Ok(result.rows_affected() > 0)
    }
}

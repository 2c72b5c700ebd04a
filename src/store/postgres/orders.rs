use async_trait::async_trait;
use uuid::Uuid;

use super::{map_err, PgStore};
use crate::store::{NewOrder, OrderStore, Page, StoreResult};
use crate::{Order, OrderDetails, OrderStatus};

#[async_trait]
impl OrderStore for PgStore {
    async fn place(&self, order: NewOrder) -> StoreResult<Option<Order>> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        // The conditional decrement is the stock check; losing a race leaves zero rows touched.
        let taken = sqlx::query("UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1 AND stock >= $2")
            .bind(order.product_id).bind(order.quantity).execute(&mut *tx).await.map_err(map_err)?;
        if taken.rows_affected() == 0 {
            return Ok(None);
        }
        let placed = sqlx::query_as::<_, Order>("INSERT INTO orders (id, user_id, product_id, quantity, total_amount, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(order.user_id).bind(order.product_id).bind(order.quantity)
            .bind(order.total_amount).bind(OrderStatus::Pending)
            .fetch_one(&mut *tx).await.map_err(map_err)?;
        tx.commit().await.map_err(map_err)?;
        Ok(Some(placed))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<OrderDetails>> {
        let Some(order) = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(map_err)?
        else {
            return Ok(None);
        };
        let mut products = self.products_by_id(vec![order.product_id]).await?;
        Ok(products.remove(&order.product_id).map(|product| OrderDetails { order, product }))
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<OrderDetails>> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3")
            .bind(user_id).bind(page.size() as i64).bind(page.offset() as i64)
            .fetch_all(&self.pool).await.map_err(map_err)?;
        let products = self.products_by_id(orders.iter().map(|o| o.product_id).collect()).await?;
        Ok(orders.into_iter().filter_map(|order| {
            let product = products.get(&order.product_id).cloned()?;
            Some(OrderDetails { order, product })
        }).collect())
    }

    async fn transition(&self, id: Uuid, from: OrderStatus, to: OrderStatus, restock: bool) -> StoreResult<Option<Order>> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        let Some(order) = sqlx::query_as::<_, Order>("UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *")
            .bind(id).bind(from).bind(to).fetch_optional(&mut *tx).await.map_err(map_err)?
        else {
            return Ok(None);
        };
        if restock {
            sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
                .bind(order.product_id).bind(order.quantity).execute(&mut *tx).await.map_err(map_err)?;
        }
        tx.commit().await.map_err(map_err)?;
        Ok(Some(order))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        let Some(order) = sqlx::query_as::<_, Order>("DELETE FROM orders WHERE id = $1 RETURNING *")
            .bind(id).fetch_optional(&mut *tx).await.map_err(map_err)?
        else {
            return Ok(false);
        };
        if order.status.holds_stock() {
            sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
                .bind(order.product_id).bind(order.quantity).execute(&mut *tx).await.map_err(map_err)?;
        }
        tx.commit().await.map_err(map_err)?;
        Ok(true)
    }
}

//! Order placement and the order status lifecycle.
//!
//! Placement takes stock in the same transaction that writes the order, so
//! two buyers racing for the last units cannot both succeed. Cancelling or
//! deleting a pending order hands its units back. Only admins move orders
//! through fulfilment; owners may cancel their own.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{money, quantity, required};
use crate::domain::aggregates::{availability, order_total, Availability};
use crate::store::{NewOrder, Page, Store};
use crate::{Order, OrderDetails, OrderStatus, Result, ShopError, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    /// Overrides price times quantity when present.
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: Option<OrderStatus>,
}

pub async fn create_order(store: &Store, user_id: Uuid, input: OrderInput) -> Result<Order> {
    let product_id = required(input.product_id, "productId", "Product ID is required")?;
    let qty = quantity(required(input.quantity, "quantity", "Quantity is required")?)?;
    let explicit = input.total_amount.map(|t| money("totalAmount", "Total amount", t)).transpose()?;

    let product = store.products.get(product_id).await?.ok_or(ShopError::NotFound("Product"))?;
    if let Availability::Short { .. } = availability(&product, qty) {
        return Err(ShopError::OutOfStock);
    }
    let unit_price = money("price", "Price", product.price)?;
    let total = order_total(unit_price, qty, explicit)
        .map_err(|err| ShopError::invalid("quantity", format!("Order total {err}")))?;

    let placed = store
        .orders
        .place(NewOrder { user_id, product_id, quantity: qty.value(), total_amount: total.amount() })
        .await?;
    let Some(order) = placed else {
        warn!(%product_id, quantity = qty.value(), "stock taken by a concurrent order");
        return Err(ShopError::OutOfStock);
    };
    info!(order_id = %order.id, %product_id, quantity = order.quantity, total = %total, "order placed");
    Ok(order)
}

/// Orders are visible to their owner and to admins; anyone else gets `NotFound`.
pub async fn get_order(store: &Store, caller: &User, id: Uuid) -> Result<OrderDetails> {
    let details = store.orders.get(id).await?.ok_or(ShopError::NotFound("Order"))?;
    if details.order.user_id != caller.id && !caller.role.is_admin() {
        return Err(ShopError::NotFound("Order"));
    }
    Ok(details)
}

pub async fn list_orders(store: &Store, user_id: Uuid, page: Page) -> Result<Vec<OrderDetails>> {
    Ok(store.orders.list_for_user(user_id, page).await?)
}

pub async fn update_order_status(store: &Store, caller: &User, id: Uuid, input: StatusChange) -> Result<Order> {
    let to = required(input.status, "status", "Status is required")?;
    let from = get_order(store, caller, id).await?.order.status;
    if to != OrderStatus::Cancelled && !caller.role.is_admin() {
        debug!(order_id = %id, user_id = %caller.id, %to, "fulfilment status refused");
        return Err(ShopError::Forbidden);
    }
    if !from.can_become(to) {
        return Err(ShopError::InvalidTransition { from, to });
    }

    let order = store
        .orders
        .transition(id, from, to, to.releases_stock())
        .await?
        .ok_or_else(|| ShopError::Conflict("Order status changed concurrently".into()))?;
    info!(order_id = %id, %from, %to, "order status changed");
    Ok(order)
}

pub async fn delete_order(store: &Store, caller: &User, id: Uuid) -> Result<()> {
    get_order(store, caller, id).await?;
    if !store.orders.delete(id).await? {
        return Err(ShopError::NotFound("Order"));
    }
    info!(order_id = %id, "order deleted");
    Ok(())
}

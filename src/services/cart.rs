//! Per-user cart lines, checked against live stock on every write.

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::{quantity, required};
use crate::domain::aggregates::{availability, Availability};
use crate::domain::value_objects::Quantity;
use crate::store::Store;
use crate::{CartItem, CartLine, Product, Result, ShopError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAdd {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuantity {
    pub quantity: Option<i32>,
}

fn ensure_available(product: &Product, qty: Quantity) -> Result<()> {
    match availability(product, qty) {
        Availability::InStock => Ok(()),
        Availability::Short { requested, on_hand } => {
            debug!(product_id = %product.id, requested, on_hand, "cart quantity exceeds stock");
            Err(ShopError::OutOfStock)
        }
    }
}

/// Creates the caller's line for a product or replaces its quantity.
/// The flag is true when a new line was created.
pub async fn add_to_cart(store: &Store, user_id: Uuid, input: CartAdd) -> Result<(CartItem, bool)> {
    let product_id = required(input.product_id, "productId", "Product ID is required")?;
    let qty = quantity(required(input.quantity, "quantity", "Quantity is required")?)?;

    let product = store.products.get(product_id).await?.ok_or(ShopError::NotFound("Product"))?;
    ensure_available(&product, qty)?;
    Ok(store.carts.upsert(user_id, product.id, qty.value()).await?)
}

pub async fn get_cart(store: &Store, user_id: Uuid) -> Result<Vec<CartLine>> {
    Ok(store.carts.lines(user_id).await?)
}

pub async fn update_cart_item(store: &Store, user_id: Uuid, id: Uuid, input: CartQuantity) -> Result<CartItem> {
    let qty = quantity(required(input.quantity, "quantity", "Quantity is required")?)?;

    let item = store.carts.get(id, user_id).await?.ok_or(ShopError::NotFound("Cart item"))?;
    let product = store.products.get(item.product_id).await?.ok_or(ShopError::NotFound("Product"))?;
    ensure_available(&product, qty)?;
    store.carts.set_quantity(id, user_id, qty.value()).await?.ok_or(ShopError::NotFound("Cart item"))
}

pub async fn remove_cart_item(store: &Store, user_id: Uuid, id: Uuid) -> Result<()> {
    if store.carts.delete(id, user_id).await? {
        Ok(())
    } else {
        Err(ShopError::NotFound("Cart item"))
    }
}

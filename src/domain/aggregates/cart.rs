//! Cart Aggregate
//!
//! Cart lines never hold stock back. Every mutation re-reads the product and
//! checks the requested quantity against what is on hand right now, so two
//! carts can each ask for more than half of the remaining units. Order
//! placement is where stock is actually taken.

use crate::domain::value_objects::{Quantity, Stock};
use crate::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    InStock,
    Short { requested: i32, on_hand: i32 },
}

/// Checks a requested line quantity against the product's live stock.
pub fn availability(product: &Product, qty: Quantity) -> Availability {
    // A row with negative stock cannot exist; treat one as empty.
    let on_hand = Stock::new(product.stock).unwrap_or_default();
    if on_hand.covers(qty) {
        Availability::InStock
    } else {
        Availability::Short { requested: qty.value(), on_hand: on_hand.value() }
    }
}

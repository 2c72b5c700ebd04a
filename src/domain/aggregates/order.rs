//! Order Aggregate

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::domain::value_objects::{Money, Quantity, ValueError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [Self::Pending, Self::Shipped, Self::Delivered, Self::Cancelled];

    /// Forward-only lifecycle: pending -> {shipped, cancelled}, shipped -> delivered.
    pub fn next_states(self) -> &'static [OrderStatus] {
        match self {
            Self::Pending => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    pub fn can_become(self, next: OrderStatus) -> bool { self.next_states().contains(&next) }
    pub fn is_terminal(self) -> bool { self.next_states().is_empty() }

    /// Entering this state hands the order's units back to product stock.
    pub fn releases_stock(self) -> bool { self == Self::Cancelled }

    /// The order's units are out of stock but have not left the shop yet.
    pub fn holds_stock(self) -> bool { self == Self::Pending }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An explicitly supplied total wins; otherwise the order costs unit price times quantity.
pub fn order_total(unit_price: Money, qty: Quantity, explicit: Option<Money>) -> Result<Money, ValueError> {
    match explicit {
        Some(total) => Ok(total),
        None => unit_price.times(qty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use OrderStatus::*;

    #[rstest]
    #[case(Pending, Shipped, true)]
    #[case(Pending, Cancelled, true)]
    #[case(Pending, Delivered, false)]
    #[case(Pending, Pending, false)]
    #[case(Shipped, Delivered, true)]
    #[case(Shipped, Cancelled, false)]
    #[case(Shipped, Pending, false)]
    #[case(Delivered, Pending, false)]
    #[case(Delivered, Cancelled, false)]
    #[case(Cancelled, Pending, false)]
    #[case(Cancelled, Shipped, false)]
    fn test_transition_table(#[case] from: OrderStatus, #[case] to: OrderStatus, #[case] allowed: bool) {
        assert_eq!(from.can_become(to), allowed);
    }

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![Delivered, Cancelled]);
        assert!(Cancelled.releases_stock());
        assert!(!Delivered.releases_stock());
        let holding: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.holds_stock()).collect();
        assert_eq!(holding, vec![Pending]);
    }

    #[test]
    fn test_order_total() {
        let price = Money::new(Decimal::new(999, 2)).unwrap();
        let qty = Quantity::new(3).unwrap();
        assert_eq!(order_total(price, qty, None).unwrap().amount(), Decimal::new(2997, 2));
        let agreed = Money::new(Decimal::new(25, 0)).unwrap();
        assert_eq!(order_total(price, qty, Some(agreed)).unwrap(), agreed);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_value(Shipped).unwrap(), "shipped");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, Cancelled);
    }
}

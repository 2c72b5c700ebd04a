//! Value objects for the storefront domain

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("must not be negative")]
    Negative,
    #[error("must be greater than zero")]
    NotPositive,
    #[error("is too large")]
    Overflow,
}

/// Money value object: a non-negative amount kept to cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// Largest amount a `NUMERIC(12,2)` column holds.
    pub const MAX: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

    pub fn new(amount: Decimal) -> Result<Self, ValueError> {
        if amount < Decimal::ZERO { return Err(ValueError::Negative); }
        let amount = amount.round_dp(2);
        if amount > Self::MAX { return Err(ValueError::Overflow); }
        Ok(Self(amount))
    }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn times(&self, qty: Quantity) -> Result<Money, ValueError> {
        let total = self.0.checked_mul(Decimal::from(qty.value())).ok_or(ValueError::Overflow)?;
        Self::new(total)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

/// Quantity value object: how many units a cart line or order asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i32) -> Result<Self, ValueError> {
        if value <= 0 { return Err(ValueError::NotPositive); }
        Ok(Self(value))
    }
    pub fn value(&self) -> i32 { self.0 }
}

/// Units of a product on hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Stock(i32);

impl Stock {
    pub fn new(value: i32) -> Result<Self, ValueError> {
        if value < 0 { return Err(ValueError::Negative); }
        Ok(Self(value))
    }
    pub fn value(&self) -> i32 { self.0 }
    pub fn covers(&self, qty: Quantity) -> bool { qty.value() <= self.0 }
    pub fn take(&self, qty: Quantity) -> Option<Self> {
        if self.covers(qty) { Some(Self(self.0 - qty.value())) } else { None }
    }
    pub fn restore(&self, qty: Quantity) -> Result<Self, ValueError> {
        self.0.checked_add(qty.value()).map(Self).ok_or(ValueError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Decimal::new(-1, 0), Err(ValueError::Negative))]
    #[case(Decimal::new(-1, 2), Err(ValueError::Negative))]
    #[case(Decimal::ZERO, Ok(Decimal::ZERO))]
    #[case(Decimal::new(19999, 3), Ok(Decimal::new(2000, 2)))]
    #[case(Decimal::new(999_999_999_999, 2), Ok(Decimal::new(999_999_999_999, 2)))]
    #[case(Decimal::new(1_000_000_000_000, 2), Err(ValueError::Overflow))]
    #[case(Decimal::new(9_999_999_999_995, 3), Err(ValueError::Overflow))]
    fn test_money_bounds(#[case] input: Decimal, #[case] expected: Result<Decimal, ValueError>) {
        assert_eq!(Money::new(input).map(|m| m.amount()), expected);
    }

    #[test]
    fn test_money_times() {
        let price = Money::new(Decimal::new(1250, 2)).unwrap();
        let total = price.times(Quantity::new(3).unwrap()).unwrap();
        assert_eq!(total.amount(), Decimal::new(3750, 2));
        assert_eq!(total.to_string(), "37.50");

        let dear = Money::new(Decimal::new(9_999_999, 0)).unwrap();
        assert_eq!(dear.times(Quantity::new(10_000).unwrap()), Err(ValueError::Overflow));
    }

    #[test]
    fn test_money_max_fits_numeric_12_2() {
        assert_eq!(Money::MAX, Decimal::new(999_999_999_999, 2));
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn test_quantity_rejects_non_positive(#[case] value: i32) {
        assert_eq!(Quantity::new(value), Err(ValueError::NotPositive));
    }

    #[test]
    fn test_stock_take_and_restore() {
        let stock = Stock::new(5).unwrap();
        let three = Quantity::new(3).unwrap();
        let left = stock.take(three).unwrap();
        assert_eq!(left.value(), 2);
        assert!(left.take(three).is_none());
        assert_eq!(left.restore(three).unwrap(), stock);
        assert_eq!(Stock::new(-1), Err(ValueError::Negative));
    }
}

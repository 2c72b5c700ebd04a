//! Domain operations.
//!
//! Every operation takes the [`Store`](crate::store::Store) context as an
//! argument, validates its input and maps storage outcomes onto
//! [`ShopError`]. Request bodies are defined next to the operations that
//! consume them.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod payments;
pub mod users;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::domain::value_objects::{Money, Quantity, ValueError};
use crate::{Result, ShopError};

pub(crate) fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub(crate) fn non_negative(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

/// Unwraps a body field the caller must send.
pub(crate) fn required<T>(value: Option<T>, field: &str, message: &str) -> Result<T> {
    value.ok_or_else(|| ShopError::invalid(field, message))
}

pub(crate) fn money(field: &str, label: &str, amount: Decimal) -> Result<Money> {
    Money::new(amount).map_err(|err| value_error(field, label, err))
}

pub(crate) fn quantity(value: i32) -> Result<Quantity> {
    Quantity::new(value).map_err(|err| value_error("quantity", "Quantity", err))
}

fn value_error(field: &str, label: &str, err: ValueError) -> ShopError {
    ShopError::invalid(field, format!("{label} {err}"))
}

/// Trims a text field, mapping whitespace-only input to `None`.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;

    use crate::services::{catalog, users};
    use crate::store::Store;
    use crate::{Product, Role, User};

    pub async fn user(store: &Store, name: &str, role: Role) -> User {
        let hash = crate::auth::hash_password("password123".into()).await.unwrap();
        store
            .users
            .insert(crate::store::NewUser {
                username: name.into(),
                email: format!("{name}@example.com"),
                password_hash: hash,
                role,
            })
            .await
            .unwrap()
    }

    pub async fn product(store: &Store, seller: &User, name: &str, price: i64, stock: i32) -> Product {
        let input = catalog::ProductInput {
            name: name.into(),
            description: None,
            price: Some(Decimal::new(price, 2)),
            stock: Some(stock),
            image_url: None,
            category_id: None,
            category_name: Some("Books".into()),
        };
        catalog::create_product(store, seller, input).await.unwrap()
    }

    pub fn registration(name: &str) -> users::Registration {
        users::Registration {
            username: name.into(),
            email: format!("{name}@example.com"),
            password: "password123".into(),
            role: None,
        }
    }
}

//! Payment records. Amounts are stored as given and not matched to orders.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{money, required};
use crate::store::{NewPayment, Page, PaymentChanges, Store};
use crate::{Payment, PaymentStatus, Result, ShopError};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub amount: Option<Decimal>,
    #[serde(default, alias = "paymentMethod")]
    #[validate(custom(function = "crate::services::not_blank", message = "Payment method is required"))]
    pub method: String,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    #[validate(custom(function = "crate::services::non_negative", message = "Amount must not be negative"))]
    pub amount: Option<Decimal>,
    #[serde(alias = "paymentMethod")]
    #[validate(custom(function = "crate::services::not_blank", message = "Payment method must not be blank"))]
    pub method: Option<String>,
    pub status: Option<PaymentStatus>,
}

pub async fn create_payment(store: &Store, user_id: Uuid, input: PaymentInput) -> Result<Payment> {
    input.validate()?;
    let amount = money("amount", "Amount", required(input.amount, "amount", "Amount is required")?)?;

    let payment = store
        .payments
        .insert(NewPayment {
            user_id,
            amount: amount.amount(),
            method: input.method.trim().to_string(),
            status: input.status.unwrap_or_default(),
        })
        .await?;
    info!(payment_id = %payment.id, %amount, "payment recorded");
    Ok(payment)
}

pub async fn list_payments(store: &Store, user_id: Uuid, page: Page) -> Result<Vec<Payment>> {
    Ok(store.payments.list_for_user(user_id, page).await?)
}

pub async fn get_payment(store: &Store, user_id: Uuid, id: Uuid) -> Result<Payment> {
    store.payments.get(id, user_id).await?.ok_or(ShopError::NotFound("Payment"))
}

/// Overwrites only the fields present in `input`.
pub async fn update_payment(store: &Store, user_id: Uuid, id: Uuid, input: PaymentUpdate) -> Result<Payment> {
    input.validate()?;
    let amount = input.amount.map(|a| money("amount", "Amount", a)).transpose()?;
    let changes = PaymentChanges {
        amount: amount.map(|a| a.amount()),
        method: input.method.map(|m| m.trim().to_string()),
        status: input.status,
    };
    store.payments.update(id, user_id, changes).await?.ok_or(ShopError::NotFound("Payment"))
}

pub async fn delete_payment(store: &Store, user_id: Uuid, id: Uuid) -> Result<()> {
    if !store.payments.delete(id, user_id).await? {
        return Err(ShopError::NotFound("Payment"));
    }
    Ok(())
}

//! Entity access layer.
//!
//! One trait per table. Implementations report a missing row through
//! `Option`/`bool` and storage failures through [`StoreError`]; turning those
//! into API errors is the services' job. [`Store`] bundles one implementation
//! of every trait and is built once at startup, then passed explicitly to
//! every domain operation.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    CartItem, CartLine, Category, Order, OrderDetails, OrderStatus, Payment, PaymentStatus, Product, Role, User,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Duplicate(String),
    /// A foreign key rejected the write or delete.
    #[error("{0}")]
    Referenced(String),
    #[error("database error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub(crate) const EMAIL_TAKEN: &str = "Email is already registered";
pub(crate) const USERNAME_TAKEN: &str = "Username is already taken";
pub(crate) const CATEGORY_EXISTS: &str = "Category already exists";
pub(crate) const PRODUCT_EXISTS: &str = "Product already exists";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> usize { (self.page as usize - 1) * self.limit as usize }
    pub fn size(&self) -> usize { self.limit as usize }
}

impl Default for Page {
    fn default() -> Self { Self::new(None, None) }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentChanges {
    pub amount: Option<Decimal>,
    pub method: Option<String>,
    pub status: Option<PaymentStatus>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list(&self, page: Page) -> StoreResult<Vec<User>>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>>;
    /// Removes the user together with their cart lines, orders and payments.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert(&self, category: NewCategory) -> StoreResult<Category>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Category>>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>>;
    async fn list(&self, page: Page) -> StoreResult<Vec<Category>>;
    async fn update(&self, id: Uuid, changes: CategoryChanges) -> StoreResult<Option<Category>>;
    /// Fails with [`StoreError::Referenced`] while products still use the category.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: NewProduct) -> StoreResult<Product>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Product>>;
    async fn list(&self, filter: ProductFilter, page: Page) -> StoreResult<Vec<Product>>;
    async fn update(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>>;
    /// Drops cart lines for the product; fails with [`StoreError::Referenced`] while orders use it.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Creates or replaces the (user, product) line. The flag is true when a row was created.
    async fn upsert(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<(CartItem, bool)>;
    async fn lines(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<CartItem>>;
    async fn set_quantity(&self, id: Uuid, user_id: Uuid, quantity: i32) -> StoreResult<Option<CartItem>>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a pending order and takes its quantity out of product stock in
    /// one transaction. Returns `None`, writing nothing, when stock no longer
    /// covers the quantity.
    async fn place(&self, order: NewOrder) -> StoreResult<Option<Order>>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<OrderDetails>>;
    async fn list_for_user(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<OrderDetails>>;
    /// Moves the order from `from` to `to`, returning its quantity to stock
    /// when `restock` is set. Returns `None` when the order is gone or is no
    /// longer in `from`.
    async fn transition(&self, id: Uuid, from: OrderStatus, to: OrderStatus, restock: bool)
        -> StoreResult<Option<Order>>;
    /// Removes the order. A pending order's quantity goes back to product
    /// stock in the same transaction.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: NewPayment) -> StoreResult<Payment>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<Payment>>;
    async fn list_for_user(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<Payment>>;
    async fn update(&self, id: Uuid, user_id: Uuid, changes: PaymentChanges) -> StoreResult<Option<Payment>>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool>;
}

/// Data-access context handed to every domain operation.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub payments: Arc<dyn PaymentStore>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::default()))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + CategoryStore + ProductStore + CartStore + OrderStore + PaymentStore + 'static,
    {
        Self {
            users: backend.clone(),
            categories: backend.clone(),
            products: backend.clone(),
            carts: backend.clone(),
            orders: backend.clone(),
            payments: backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_caps() {
        assert_eq!(Page::default(), Page { page: 1, limit: 10 });
        assert_eq!(Page::new(Some(0), Some(1000)), Page { page: 1, limit: 100 });
        assert_eq!(Page::new(Some(3), Some(20)).offset(), 40);
        assert_eq!(Page::new(None, Some(0)).size(), 1);
    }
}

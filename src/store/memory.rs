//! In-memory implementation of the entity access traits.
//!
//! Mirrors the Postgres schema's unique keys, foreign keys and cascades so
//! the services behave the same on either backend. Backs the test suite and
//! servers started without `DATABASE_URL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CartStore, CategoryChanges, CategoryStore, NewCategory, NewOrder, NewPayment, NewProduct, NewUser, OrderStore,
    Page, PaymentChanges, PaymentStore, ProductChanges, ProductFilter, ProductStore, StoreError, StoreResult,
    UserChanges, UserStore, CATEGORY_EXISTS, EMAIL_TAKEN, PRODUCT_EXISTS, USERNAME_TAKEN,
};
use crate::domain::value_objects::{Quantity, Stock};
use crate::{CartItem, CartLine, Category, Order, OrderDetails, OrderStatus, Payment, Product, User};

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    categories: BTreeMap<Uuid, Category>,
    products: BTreeMap<Uuid, Product>,
    carts: BTreeMap<Uuid, CartItem>,
    orders: BTreeMap<Uuid, Order>,
    payments: BTreeMap<Uuid, Payment>,
}

impl Tables {
    fn require_user(&self, id: Uuid) -> StoreResult<()> {
        if self.users.contains_key(&id) { Ok(()) } else { Err(StoreError::Referenced("user_id".into())) }
    }

    fn require_product(&self, id: Uuid) -> StoreResult<()> {
        if self.products.contains_key(&id) { Ok(()) } else { Err(StoreError::Referenced("product_id".into())) }
    }

    fn require_category(&self, id: Uuid) -> StoreResult<()> {
        if self.categories.contains_key(&id) { Ok(()) } else { Err(StoreError::Referenced("category_id".into())) }
    }

    fn details(&self, order: &Order) -> Option<OrderDetails> {
        let product = self.products.get(&order.product_id)?.clone();
        Some(OrderDetails { order: order.clone(), product })
    }
}

/// Newest first, ties broken by id, then sliced to the page.
fn newest_first<T: Clone>(rows: impl Iterator<Item = T>, stamp: impl Fn(&T) -> (DateTime<Utc>, Uuid), page: Page) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| std::cmp::Reverse(stamp(row)));
    rows.into_iter().skip(page.offset()).take(page.size()).collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == user.email) { return Err(StoreError::Duplicate(EMAIL_TAKEN.into())); }
        if t.users.values().any(|u| u.username == user.username) { return Err(StoreError::Duplicate(USERNAME_TAKEN.into())); }
        let now = Utc::now();
        let row = User {
            id: Uuid::now_v7(), username: user.username, email: user.email, password_hash: user.password_hash,
            role: user.role, created_at: now, updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, page: Page) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(newest_first(t.users.values().cloned(), |u| (u.created_at, u.id), page))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) { return Ok(None); }
        if let Some(email) = &changes.email {
            if t.users.values().any(|u| u.id != id && &u.email == email) { return Err(StoreError::Duplicate(EMAIL_TAKEN.into())); }
        }
        if let Some(username) = &changes.username {
            if t.users.values().any(|u| u.id != id && &u.username == username) {
                return Err(StoreError::Duplicate(USERNAME_TAKEN.into()));
            }
        }
        let Some(user) = t.users.get_mut(&id) else { return Ok(None) };
        if let Some(username) = changes.username { user.username = username; }
        if let Some(email) = changes.email { user.email = email; }
        if let Some(hash) = changes.password_hash { user.password_hash = hash; }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() { return Ok(false); }
        t.carts.retain(|_, c| c.user_id != id);
        t.orders.retain(|_, o| o.user_id != id);
        t.payments.retain(|_, p| p.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn insert(&self, category: NewCategory) -> StoreResult<Category> {
        let mut t = self.tables.write().await;
        if t.categories.values().any(|c| c.name == category.name) { return Err(StoreError::Duplicate(CATEGORY_EXISTS.into())); }
        let now = Utc::now();
        let row = Category { id: Uuid::now_v7(), name: category.name, description: category.description, created_at: now, updated_at: now };
        t.categories.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.values().find(|c| c.name == name).cloned())
    }

    async fn list(&self, page: Page) -> StoreResult<Vec<Category>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Category> = t.categories.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows.into_iter().skip(page.offset()).take(page.size()).collect())
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> StoreResult<Option<Category>> {
        let mut t = self.tables.write().await;
        if let Some(name) = &changes.name {
            if t.categories.values().any(|c| c.id != id && &c.name == name) {
                return Err(StoreError::Duplicate(CATEGORY_EXISTS.into()));
            }
        }
        let Some(category) = t.categories.get_mut(&id) else { return Ok(None) };
        if let Some(name) = changes.name { category.name = name; }
        if let Some(description) = changes.description { category.description = Some(description); }
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.categories.contains_key(&id) { return Ok(false); }
        if t.products.values().any(|p| p.category_id == id) {
            return Err(StoreError::Referenced("products_category_id_fkey".into()));
        }
        t.categories.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        let mut t = self.tables.write().await;
        if t.products.values().any(|p| p.name == product.name) { return Err(StoreError::Duplicate(PRODUCT_EXISTS.into())); }
        t.require_category(product.category_id)?;
        let now = Utc::now();
        let row = Product {
            id: Uuid::now_v7(), name: product.name, description: product.description, price: product.price.round_dp(2),
            stock: product.stock, image_url: product.image_url, category_id: product.category_id,
            created_at: now, updated_at: now,
        };
        t.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn list(&self, filter: ProductFilter, page: Page) -> StoreResult<Vec<Product>> {
        let t = self.tables.read().await;
        let rows = t.products.values().filter(|p| filter.category_id.map_or(true, |c| p.category_id == c)).cloned();
        Ok(newest_first(rows, |p| (p.created_at, p.id), page))
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>> {
        let mut t = self.tables.write().await;
        if !t.products.contains_key(&id) { return Ok(None); }
        if let Some(name) = &changes.name {
            if t.products.values().any(|p| p.id != id && &p.name == name) {
                return Err(StoreError::Duplicate(PRODUCT_EXISTS.into()));
            }
        }
        if let Some(category_id) = changes.category_id { t.require_category(category_id)?; }
        let Some(product) = t.products.get_mut(&id) else { return Ok(None) };
        if let Some(name) = changes.name { product.name = name; }
        if let Some(description) = changes.description { product.description = Some(description); }
        if let Some(price) = changes.price { product.price = price.round_dp(2); }
        if let Some(stock) = changes.stock { product.stock = stock; }
        if let Some(url) = changes.image_url { product.image_url = Some(url); }
        if let Some(category_id) = changes.category_id { product.category_id = category_id; }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.products.contains_key(&id) { return Ok(false); }
        if t.orders.values().any(|o| o.product_id == id) {
            return Err(StoreError::Referenced("orders_product_id_fkey".into()));
        }
        t.products.remove(&id);
        t.carts.retain(|_, c| c.product_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn upsert(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<(CartItem, bool)> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        t.require_product(product_id)?;
        let now = Utc::now();
        if let Some(line) = t.carts.values_mut().find(|c| c.user_id == user_id && c.product_id == product_id) {
            line.quantity = quantity;
            line.updated_at = now;
            return Ok((line.clone(), false));
        }
        let row = CartItem { id: Uuid::now_v7(), user_id, product_id, quantity, created_at: now, updated_at: now };
        t.carts.insert(row.id, row.clone());
        Ok((row, true))
    }

    async fn lines(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
        let t = self.tables.read().await;
        let mut items: Vec<&CartItem> = t.carts.values().filter(|c| c.user_id == user_id).collect();
        items.sort_by_key(|c| (c.created_at, c.id));
        Ok(items.into_iter().filter_map(|item| {
            let product = t.products.get(&item.product_id)?.clone();
            Some(CartLine { item: item.clone(), product })
        }).collect())
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<CartItem>> {
        let t = self.tables.read().await;
        Ok(t.carts.get(&id).filter(|c| c.user_id == user_id).cloned())
    }

    async fn set_quantity(&self, id: Uuid, user_id: Uuid, quantity: i32) -> StoreResult<Option<CartItem>> {
        let mut t = self.tables.write().await;
        let Some(line) = t.carts.get_mut(&id).filter(|c| c.user_id == user_id) else { return Ok(None) };
        line.quantity = quantity;
        line.updated_at = Utc::now();
        Ok(Some(line.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.carts.get(&id).is_some_and(|c| c.user_id == user_id) { return Ok(false); }
        t.carts.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place(&self, order: NewOrder) -> StoreResult<Option<Order>> {
        let mut t = self.tables.write().await;
        t.require_user(order.user_id)?;
        let Some(product) = t.products.get_mut(&order.product_id) else {
            return Err(StoreError::Referenced("product_id".into()));
        };
        let qty = Quantity::new(order.quantity).map_err(|e| StoreError::Backend(format!("quantity {e}")))?;
        let Some(left) = Stock::new(product.stock).ok().and_then(|on_hand| on_hand.take(qty)) else {
            return Ok(None);
        };
        let now = Utc::now();
        product.stock = left.value();
        product.updated_at = now;
        let row = Order {
            id: Uuid::now_v7(), user_id: order.user_id, product_id: order.product_id, quantity: order.quantity,
            total_amount: order.total_amount.round_dp(2), status: OrderStatus::Pending, created_at: now, updated_at: now,
        };
        t.orders.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<OrderDetails>> {
        let t = self.tables.read().await;
        Ok(t.orders.get(&id).and_then(|o| t.details(o)))
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<OrderDetails>> {
        let t = self.tables.read().await;
        let rows = t.orders.values().filter(|o| o.user_id == user_id).cloned();
        Ok(newest_first(rows, |o| (o.created_at, o.id), page).iter().filter_map(|o| t.details(o)).collect())
    }

    async fn transition(&self, id: Uuid, from: OrderStatus, to: OrderStatus, restock: bool) -> StoreResult<Option<Order>> {
        let mut t = self.tables.write().await;
        let Some(current) = t.orders.get(&id).filter(|o| o.status == from) else { return Ok(None) };
        let (product_id, quantity) = (current.product_id, current.quantity);
        let restocked = match t.products.get(&product_id) {
            Some(product) if restock => {
                let back = Stock::new(product.stock)
                    .and_then(|on_hand| on_hand.restore(Quantity::new(quantity)?))
                    .map_err(|e| StoreError::Backend(format!("restock {e}")))?;
                Some(back)
            }
            _ => None,
        };

        let now = Utc::now();
        if let (Some(back), Some(product)) = (restocked, t.products.get_mut(&product_id)) {
            product.stock = back.value();
            product.updated_at = now;
        }
        let Some(order) = t.orders.get_mut(&id) else { return Ok(None) };
        order.status = to;
        order.updated_at = now;
        Ok(Some(order.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let Some(order) = t.orders.get(&id) else { return Ok(false) };
        let (product_id, quantity, status) = (order.product_id, order.quantity, order.status);
        let restocked = match t.products.get(&product_id) {
            Some(product) if status.holds_stock() => Some(
                Stock::new(product.stock)
                    .and_then(|on_hand| on_hand.restore(Quantity::new(quantity)?))
                    .map_err(|e| StoreError::Backend(format!("restock {e}")))?,
            ),
            _ => None,
        };

        if let (Some(back), Some(product)) = (restocked, t.products.get_mut(&product_id)) {
            product.stock = back.value();
            product.updated_at = Utc::now();
        }
        Ok(t.orders.remove(&id).is_some())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert(&self, payment: NewPayment) -> StoreResult<Payment> {
        let mut t = self.tables.write().await;
        t.require_user(payment.user_id)?;
        let now = Utc::now();
        let row = Payment {
            id: Uuid::now_v7(), user_id: payment.user_id, amount: payment.amount.round_dp(2), method: payment.method,
            status: payment.status, created_at: now, updated_at: now,
        };
        t.payments.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<Payment>> {
        let t = self.tables.read().await;
        Ok(t.payments.get(&id).filter(|p| p.user_id == user_id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<Payment>> {
        let t = self.tables.read().await;
        let rows = t.payments.values().filter(|p| p.user_id == user_id).cloned();
        Ok(newest_first(rows, |p| (p.created_at, p.id), page))
    }

    async fn update(&self, id: Uuid, user_id: Uuid, changes: PaymentChanges) -> StoreResult<Option<Payment>> {
        let mut t = self.tables.write().await;
        let Some(payment) = t.payments.get_mut(&id).filter(|p| p.user_id == user_id) else { return Ok(None) };
        if let Some(amount) = changes.amount { payment.amount = amount.round_dp(2); }
        if let Some(method) = changes.method { payment.method = method; }
        if let Some(status) = changes.status { payment.status = status; }
        payment.updated_at = Utc::now();
        Ok(Some(payment.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.payments.get(&id).is_some_and(|p| p.user_id == user_id) { return Ok(false); }
        t.payments.remove(&id);
        Ok(true)
    }
}

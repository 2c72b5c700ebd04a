//! PostgreSQL implementation of the entity access traits.

mod carts;
mod catalog;
mod orders;
mod payments;
mod users;

use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{StoreError, CATEGORY_EXISTS, EMAIL_TAKEN, PRODUCT_EXISTS, USERNAME_TAKEN};
use crate::Product;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Loads the products behind a set of cart lines or orders, keyed by id.
    async fn products_by_id(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, Product>, StoreError> {
        if ids.is_empty() { return Ok(HashMap::new()); }
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids).fetch_all(&self.pool).await.map_err(map_err)?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Maps constraint violations onto [`StoreError`]; everything else is a backend failure.
pub(super) fn map_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => return StoreError::Duplicate(duplicate_message(db.constraint()).to_string()),
            Some("23503") => {
                return StoreError::Referenced(db.constraint().unwrap_or("foreign key").to_string())
            }
            _ => {}
        }
    }
    StoreError::Backend(err.to_string())
}

fn duplicate_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => EMAIL_TAKEN,
        Some("users_username_key") => USERNAME_TAKEN,
        Some("categories_name_key") => CATEGORY_EXISTS,
        Some("products_name_key") => PRODUCT_EXISTS,
        _ => "Record already exists",
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use super::{map_err, PgStore};
use crate::store::{
    CategoryChanges, CategoryStore, NewCategory, NewProduct, Page, ProductChanges, ProductFilter, ProductStore,
    StoreResult,
};
use crate::{Category, Product};

#[async_trait]
impl CategoryStore for PgStore {
    async fn insert(&self, category: NewCategory) -> StoreResult<Category> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, description, created_at, updated_at) VALUES ($1, $2, $3, NOW(), NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(&category.name).bind(&category.description)
            .fetch_one(&self.pool).await.map_err(map_err)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1").bind(name).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn list(&self, page: Page) -> StoreResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name LIMIT $1 OFFSET $2")
            .bind(page.size() as i64).bind(page.offset() as i64).fetch_all(&self.pool).await.map_err(map_err)
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> StoreResult<Option<Category>> {
        sqlx::query_as::<_, Category>("UPDATE categories SET name = COALESCE($2, name), description = COALESCE($3, description), updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id).bind(&changes.name).bind(&changes.description)
            .fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        // products.category_id is ON DELETE RESTRICT, so a used category surfaces as Referenced
        let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&self.pool).await.map_err(map_err)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        sqlx::query_as::<_, Product>("INSERT INTO products (id, name, description, price, stock, image_url, category_id, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(&product.name).bind(&product.description).bind(product.price)
            .bind(product.stock).bind(&product.image_url).bind(product.category_id)
            .fetch_one(&self.pool).await.map_err(map_err)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn list(&self, filter: ProductFilter, page: Page) -> StoreResult<Vec<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE ($1::uuid IS NULL OR category_id = $1) ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3")
            .bind(filter.category_id).bind(page.size() as i64).bind(page.offset() as i64)
            .fetch_all(&self.pool).await.map_err(map_err)
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>> {
        sqlx::query_as::<_, Product>("UPDATE products SET name = COALESCE($2, name), description = COALESCE($3, description), price = COALESCE($4, price), stock = COALESCE($5, stock), image_url = COALESCE($6, image_url), category_id = COALESCE($7, category_id), updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id).bind(&changes.name).bind(&changes.description).bind(changes.price)
            .bind(changes.stock).bind(&changes.image_url).bind(changes.category_id)
            .fetch_optional(&self.pool).await.map_err(map_err)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await.map_err(map_err)?;
        Ok(result.rows_affected() > 0)
    }
}

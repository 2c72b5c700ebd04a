//! Categories and products.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{money, required, trimmed};
use crate::domain::aggregates::CategoryRef;
use crate::domain::value_objects::Stock;
use crate::store::{
    CategoryChanges, NewCategory, NewProduct, Page, ProductChanges, ProductFilter, Store, StoreError,
};
use crate::{Category, Product, Result, ShopError, User};

/// Categories a fresh install starts with.
pub const DEFAULT_CATEGORIES: [(&str, &str); 10] = [
    ("Electronics", "Devices and gadgets"),
    ("Home Appliances", "Kitchen and home devices"),
    ("Fashion", "Clothing and accessories"),
    ("Books", "Fiction, non-fiction, and more"),
    ("Sports", "Sporting goods and equipment"),
    ("Health & Beauty", "Personal care and wellness products"),
    ("Toys", "Toys and games for children"),
    ("Automotive", "Car accessories and parts"),
    ("Gardening", "Plants and gardening tools"),
    ("Music", "Musical instruments and accessories"),
];

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    #[validate(
        custom(function = "crate::services::not_blank", message = "Category name is required"),
        length(max = 100, message = "Category name must be at most 100 characters")
    )]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[validate(
        custom(function = "crate::services::not_blank", message = "Category name must not be blank"),
        length(max = 100, message = "Category name must be at most 100 characters")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    #[validate(custom(function = "crate::services::not_blank", message = "Product name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i32>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    /// Names a category to use, creating it when it does not exist yet.
    #[serde(alias = "newCategory")]
    #[validate(length(max = 100, message = "Category name must be at most 100 characters"))]
    pub category_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(custom(function = "crate::services::not_blank", message = "Product name must not be blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "crate::services::non_negative", message = "Price must not be negative"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i32>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}

// =============================================================================
// Categories
// =============================================================================

pub async fn create_category(store: &Store, input: CategoryInput) -> Result<Category> {
    input.validate()?;
    let category = store
        .categories
        .insert(NewCategory { name: input.name.trim().to_string(), description: trimmed(input.description) })
        .await?;
    info!(category_id = %category.id, name = %category.name, "category created");
    Ok(category)
}

pub async fn list_categories(store: &Store, page: Page) -> Result<Vec<Category>> {
    Ok(store.categories.list(page).await?)
}

pub async fn get_category(store: &Store, id: Uuid) -> Result<Category> {
    store.categories.get(id).await?.ok_or(ShopError::NotFound("Category"))
}

pub async fn update_category(store: &Store, id: Uuid, input: CategoryUpdate) -> Result<Category> {
    input.validate()?;
    let changes = CategoryChanges {
        name: input.name.map(|n| n.trim().to_string()),
        description: trimmed(input.description),
    };
    store.categories.update(id, changes).await?.ok_or(ShopError::NotFound("Category"))
}

pub async fn delete_category(store: &Store, id: Uuid) -> Result<()> {
    match store.categories.delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ShopError::NotFound("Category")),
        Err(StoreError::Referenced(_)) => Err(ShopError::Conflict("Category is in use by products".into())),
        Err(err) => Err(err.into()),
    }
}

/// Inserts whichever default categories are missing. Returns how many were added.
pub async fn seed_default_categories(store: &Store) -> Result<usize> {
    let mut added = 0;
    for (name, description) in DEFAULT_CATEGORIES {
        if store.categories.find_by_name(name).await?.is_some() {
            continue;
        }
        match store.categories.insert(NewCategory { name: name.into(), description: Some(description.into()) }).await {
            Ok(_) => added += 1,
            // another instance seeded it first
            Err(StoreError::Duplicate(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }
    info!(added, "default categories seeded");
    Ok(added)
}

async fn resolve_category(store: &Store, reference: CategoryRef) -> Result<Uuid> {
    match reference {
        CategoryRef::Id(id) => Ok(get_category(store, id).await?.id),
        CategoryRef::Name(name) => {
            if let Some(existing) = store.categories.find_by_name(&name).await? {
                return Ok(existing.id);
            }
            match store.categories.insert(NewCategory { name: name.clone(), description: None }).await {
                Ok(created) => {
                    info!(category_id = %created.id, %name, "category created for product");
                    Ok(created.id)
                }
                Err(StoreError::Duplicate(_)) => store
                    .categories
                    .find_by_name(&name)
                    .await?
                    .map(|c| c.id)
                    .ok_or(ShopError::NotFound("Category")),
                Err(err) => Err(err.into()),
            }
        }
    }
}

// =============================================================================
// Products
// =============================================================================

fn require_catalog_role(caller: &User) -> Result<()> {
    if caller.role.manages_catalog() {
        Ok(())
    } else {
        debug!(user_id = %caller.id, "catalog write refused");
        Err(ShopError::Forbidden)
    }
}

fn stock_level(value: i32) -> Result<Stock> {
    Stock::new(value).map_err(|err| ShopError::invalid("stock", format!("Stock {err}")))
}

pub async fn create_product(store: &Store, caller: &User, input: ProductInput) -> Result<Product> {
    require_catalog_role(caller)?;
    input.validate()?;

    let price = money("price", "Price", required(input.price, "price", "Price is required")?)?;
    let stock = stock_level(input.stock.unwrap_or(0))?;
    let reference = CategoryRef::from_parts(input.category_id, input.category_name.as_deref())
        .map_err(|err| ShopError::invalid("categoryId", err.to_string()))?;
    let category_id = resolve_category(store, reference).await?;

    let product = store
        .products
        .insert(NewProduct {
            name: input.name.trim().to_string(),
            description: trimmed(input.description),
            price: price.amount(),
            stock: stock.value(),
            image_url: trimmed(input.image_url),
            category_id,
        })
        .await?;
    info!(product_id = %product.id, %category_id, "product created");
    Ok(product)
}

pub async fn list_products(store: &Store, filter: ProductFilter, page: Page) -> Result<Vec<Product>> {
    Ok(store.products.list(filter, page).await?)
}

pub async fn list_products_by_category(store: &Store, category_id: Uuid, page: Page) -> Result<Vec<Product>> {
    let category = get_category(store, category_id).await?;
    list_products(store, ProductFilter { category_id: Some(category.id) }, page).await
}

pub async fn get_product(store: &Store, id: Uuid) -> Result<Product> {
    store.products.get(id).await?.ok_or(ShopError::NotFound("Product"))
}

pub async fn update_product(store: &Store, caller: &User, id: Uuid, input: ProductUpdate) -> Result<Product> {
    require_catalog_role(caller)?;
    input.validate()?;

    let price = input.price.map(|p| money("price", "Price", p)).transpose()?;
    let stock = input.stock.map(stock_level).transpose()?;
    if let Some(category_id) = input.category_id {
        get_category(store, category_id).await?;
    }
    let changes = ProductChanges {
        name: input.name.map(|n| n.trim().to_string()),
        description: trimmed(input.description),
        price: price.map(|p| p.amount()),
        stock: stock.map(|s| s.value()),
        image_url: trimmed(input.image_url),
        category_id: input.category_id,
    };
    store.products.update(id, changes).await?.ok_or(ShopError::NotFound("Product"))
}

pub async fn delete_product(store: &Store, caller: &User, id: Uuid) -> Result<()> {
    require_catalog_role(caller)?;
    match store.products.delete(id).await {
        Ok(true) => {
            info!(product_id = %id, "product deleted");
            Ok(())
        }
        Ok(false) => Err(ShopError::NotFound("Product")),
        Err(StoreError::Referenced(_)) => Err(ShopError::Conflict("Product is referenced by orders".into())),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use crate::Role;
    use rstest::rstest;

    fn product_input(name: &str, price: Decimal) -> ProductInput {
        ProductInput {
            name: name.into(),
            description: Some("  ".into()),
            price: Some(price),
            stock: Some(5),
            image_url: None,
            category_id: None,
            category_name: Some("Books".into()),
        }
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let store = Store::memory();
        assert_eq!(seed_default_categories(&store).await.unwrap(), DEFAULT_CATEGORIES.len());
        assert_eq!(seed_default_categories(&store).await.unwrap(), 0);
        let all = list_categories(&store, Page::new(None, Some(100))).await.unwrap();
        assert_eq!(all.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(all[0].name, "Automotive");
    }

    #[tokio::test]
    async fn test_category_crud() {
        let store = Store::memory();
        let created = create_category(&store, CategoryInput { name: " Games ".into(), description: None }).await.unwrap();
        assert_eq!(created.name, "Games");

        let dup = create_category(&store, CategoryInput { name: "Games".into(), description: None }).await;
        assert!(matches!(dup, Err(ShopError::AlreadyExists(_))));

        let too_long = CategoryInput { name: "x".repeat(101), description: None };
        assert!(matches!(create_category(&store, too_long).await, Err(ShopError::Validation { .. })));

        let update = CategoryUpdate { description: Some("Board and video".into()), ..Default::default() };
        let updated = update_category(&store, created.id, update).await.unwrap();
        assert_eq!(updated.name, "Games");
        assert_eq!(updated.description.as_deref(), Some("Board and video"));

        delete_category(&store, created.id).await.unwrap();
        assert!(matches!(get_category(&store, created.id).await, Err(ShopError::NotFound("Category"))));
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let store = Store::memory();
        let seller = fixtures::user(&store, "seller", Role::Seller).await;
        let product = fixtures::product(&store, &seller, "Dune", 1500, 5).await;
        let err = delete_category(&store, product.category_id).await.unwrap_err();
        assert!(matches!(err, ShopError::Conflict(_)));
    }

    #[rstest]
    #[case(Decimal::new(-1, 0), false)]
    #[case(Decimal::ZERO, true)]
    #[case(Decimal::new(1999, 2), true)]
    #[case(Decimal::new(999_999_999_999, 2), true)]
    #[case(Decimal::new(10_000_000_000, 0), false)]
    #[tokio::test]
    async fn test_product_price_bounds(#[case] price: Decimal, #[case] accepted: bool) {
        let store = Store::memory();
        let seller = fixtures::user(&store, "seller", Role::Seller).await;
        let result = create_product(&store, &seller, product_input("Widget", price)).await;
        assert_eq!(result.is_ok(), accepted, "{result:?}");
        if let Err(err) = result {
            assert!(matches!(err, ShopError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_create_product_resolves_category() {
        let store = Store::memory();
        let admin = fixtures::user(&store, "root", Role::Admin).await;

        let first = create_product(&store, &admin, product_input("Dune", Decimal::new(15, 0))).await.unwrap();
        let second = create_product(&store, &admin, product_input("Emma", Decimal::new(12, 0))).await.unwrap();
        assert_eq!(first.category_id, second.category_id);
        assert_eq!(first.description, None);

        let mut by_id = product_input("Ulysses", Decimal::new(20, 0));
        by_id.category_name = None;
        by_id.category_id = Some(first.category_id);
        assert_eq!(create_product(&store, &admin, by_id).await.unwrap().category_id, first.category_id);

        let mut neither = product_input("Beloved", Decimal::ONE);
        neither.category_name = None;
        assert!(matches!(create_product(&store, &admin, neither).await, Err(ShopError::Validation { .. })));

        let mut unknown = product_input("Ivanhoe", Decimal::ONE);
        unknown.category_name = None;
        unknown.category_id = Some(Uuid::now_v7());
        assert!(matches!(create_product(&store, &admin, unknown).await, Err(ShopError::NotFound("Category"))));

        let listed = list_products_by_category(&store, first.category_id, Page::default()).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(matches!(
            list_products_by_category(&store, Uuid::now_v7(), Page::default()).await,
            Err(ShopError::NotFound("Category"))
        ));
    }

    #[tokio::test]
    async fn test_new_category_name_is_capped() {
        let store = Store::memory();
        let seller = fixtures::user(&store, "seller", Role::Seller).await;

        let mut long = product_input("Dune", Decimal::ONE);
        long.category_name = Some("x".repeat(101));
        match create_product(&store, &seller, long).await {
            Err(ShopError::Validation { fields, .. }) => assert!(fields.contains_key("categoryName")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(list_categories(&store, Page::default()).await.unwrap().is_empty());

        let mut longest = product_input("Dune", Decimal::ONE);
        longest.category_name = Some("x".repeat(100));
        let product = create_product(&store, &seller, longest).await.unwrap();
        assert_eq!(get_category(&store, product.category_id).await.unwrap().name.len(), 100);
    }

    #[tokio::test]
    async fn test_product_writes_need_catalog_role() {
        let store = Store::memory();
        let seller = fixtures::user(&store, "seller", Role::Seller).await;
        let shopper = fixtures::user(&store, "ada", Role::Shopper).await;

        let err = create_product(&store, &shopper, product_input("Dune", Decimal::ONE)).await.unwrap_err();
        assert!(matches!(err, ShopError::Forbidden));

        let product = fixtures::product(&store, &seller, "Dune", 1500, 5).await;
        let update = ProductUpdate { stock: Some(9), ..Default::default() };
        assert!(matches!(update_product(&store, &shopper, product.id, update).await, Err(ShopError::Forbidden)));
        assert!(matches!(delete_product(&store, &shopper, product.id).await, Err(ShopError::Forbidden)));
    }

    #[tokio::test]
    async fn test_update_and_delete_product() {
        let store = Store::memory();
        let seller = fixtures::user(&store, "seller", Role::Seller).await;
        let product = fixtures::product(&store, &seller, "Dune", 1500, 5).await;

        let update = ProductUpdate { price: Some(Decimal::new(999, 2)), stock: Some(0), ..Default::default() };
        let updated = update_product(&store, &seller, product.id, update).await.unwrap();
        assert_eq!(updated.price, Decimal::new(999, 2));
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.name, "Dune");

        let negative = ProductUpdate { stock: Some(-1), ..Default::default() };
        assert!(matches!(update_product(&store, &seller, product.id, negative).await, Err(ShopError::Validation { .. })));

        delete_product(&store, &seller, product.id).await.unwrap();
        assert!(matches!(get_product(&store, product.id).await, Err(ShopError::NotFound("Product"))));
        assert!(matches!(delete_product(&store, &seller, product.id).await, Err(ShopError::NotFound("Product"))));
    }
}

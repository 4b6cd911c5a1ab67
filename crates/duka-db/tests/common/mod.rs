//! Shared fixtures for the integration tests.
//!
//! Every test gets an isolated in-memory database with migrations applied.

use duka_core::types::{NewProduct, Product};
use duka_db::{Database, DbConfig};

/// Creates an isolated in-memory database.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Inserts a shop-level product (branch_id = NULL) and returns it.
pub async fn seed_product(db: &Database, shop_id: &str, sku: &str) -> Product {
    db.products()
        .create(NewProduct {
            shop_id: shop_id.to_string(),
            branch_id: None,
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            price_cents: 1000,
            current_stock: Some(10),
        })
        .await
        .unwrap()
}

/// Inserts a branch-pinned product and returns it.
pub async fn seed_branch_product(
    db: &Database,
    shop_id: &str,
    branch_id: &str,
    sku: &str,
) -> Product {
    db.products()
        .create(NewProduct {
            shop_id: shop_id.to_string(),
            branch_id: Some(branch_id.to_string()),
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            price_cents: 1000,
            current_stock: Some(10),
        })
        .await
        .unwrap()
}

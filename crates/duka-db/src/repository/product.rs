//! # Product Repository
//!
//! Scoped database operations for products.
//!
//! Products are the shop-fallback case: `branch_id` is nullable, so a
//! product is visible when either its branch is in the caller's accessible
//! branches, or it is a shop-level record (`branch_id IS NULL`) under an
//! accessible shop.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use duka_core::device::DeviceClass;
use duka_core::pagination::{CursorPage, OffsetPage, Page, PaginationConfig};
use duka_core::types::{NewProduct, Product, ProductUpdate};

use crate::error::DbResult;
use crate::repository::query::{FilterValue, PageRequest, ScopedQuery, ScopedRow};
use crate::scope::{AccessScope, ScopeMode};

const TABLE: &str = "products";
const ENTITY: &str = "Product";

impl ScopedRow for Product {
    fn row_id(&self) -> &str {
        &self.id
    }
}

/// Caller-supplied product filters, applied after the scope predicate.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let scope = db.directory().resolve_scope(&identity).await?;
///
/// // Device-aware listing
/// let page = repo
///     .auto_paginate(&scope, &config, ctx.device, &PageRequest::default(), ProductFilter::default())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    fn query<'a>(&self, scope: &'a AccessScope, filter: ProductFilter) -> ScopedQuery<'a> {
        // Catalog order: listings and offset pages sort by SKU
        let mut query =
            ScopedQuery::new(TABLE, ScopeMode::BranchWithShopFallback, scope).order_by("sku");
        if let Some(sku) = filter.sku {
            query = query.filter("sku", FilterValue::Text(sku));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter("is_active", FilterValue::Bool(is_active));
        }
        query
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Full scoped result, unpaginated. Small/internal sets only.
    pub async fn all(&self, scope: &AccessScope, filter: ProductFilter) -> DbResult<Vec<Product>> {
        self.query(scope, filter).fetch_all(&self.pool).await
    }

    /// Offset page, forced regardless of device class.
    pub async fn paginate(
        &self,
        scope: &AccessScope,
        config: &PaginationConfig,
        device: DeviceClass,
        request: &PageRequest,
        filter: ProductFilter,
    ) -> DbResult<OffsetPage<Product>> {
        self.query(scope, filter)
            .paginate(&self.pool, config, device, request)
            .await
    }

    /// Cursor page, forced regardless of device class.
    pub async fn cursor_paginate(
        &self,
        scope: &AccessScope,
        config: &PaginationConfig,
        device: DeviceClass,
        request: &PageRequest,
        filter: ProductFilter,
    ) -> DbResult<CursorPage<Product>> {
        self.query(scope, filter)
            .cursor_paginate(&self.pool, config, device, request)
            .await
    }

    /// Device-aware pagination: strategy selected from the descriptor table.
    pub async fn auto_paginate(
        &self,
        scope: &AccessScope,
        config: &PaginationConfig,
        device: DeviceClass,
        request: &PageRequest,
        filter: ProductFilter,
    ) -> DbResult<Page<Product>> {
        self.query(scope, filter)
            .auto_paginate(&self.pool, config, device, request)
            .await
    }

    /// Scoped lookup. `Ok(None)` covers both "no such product" and "product
    /// outside the caller's scope" - indistinguishable by design.
    pub async fn find(&self, scope: &AccessScope, id: &str) -> DbResult<Option<Product>> {
        self.query(scope, ProductFilter::default())
            .find(&self.pool, id)
            .await
    }

    /// Scoped lookup raising the collapsed NotFound.
    pub async fn find_or_fail(&self, scope: &AccessScope, id: &str) -> DbResult<Product> {
        self.query(scope, ProductFilter::default())
            .find_or_fail(&self.pool, ENTITY, id)
            .await
    }

    /// Scoped count.
    pub async fn count(&self, scope: &AccessScope, filter: ProductFilter) -> DbResult<i64> {
        self.query(scope, filter).count(&self.pool).await
    }

    /// Scoped existence check.
    pub async fn exists(&self, scope: &AccessScope, id: &str) -> DbResult<bool> {
        self.query(scope, ProductFilter::default())
            .exists(&self.pool, id)
            .await
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Inserts a new product.
    ///
    /// `data.shop_id` is expected to already be verified as accessible by
    /// the calling collaborator (via
    /// [`verify_shop_access`](crate::repository::directory::DirectoryRepository::verify_shop_access));
    /// this repository does not independently re-check create-time shop
    /// ownership.
    pub async fn create(&self, data: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            shop_id: data.shop_id,
            branch_id: data.branch_id,
            sku: data.sku,
            name: data.name,
            price_cents: data.price_cents,
            current_stock: data.current_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, shop_id, branch_id, sku, name,
                price_cents, current_stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.shop_id)
        .bind(&product.branch_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates an existing product.
    ///
    /// Re-resolves through the scoped `find_or_fail` first, so no update can
    /// touch an inaccessible row.
    pub async fn update(
        &self,
        scope: &AccessScope,
        id: &str,
        data: ProductUpdate,
    ) -> DbResult<Product> {
        self.find_or_fail(scope, id).await?;

        debug!(id = %id, "Updating product");

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = ");
        qb.push_bind(Utc::now());
        if let Some(sku) = &data.sku {
            qb.push(", sku = ");
            qb.push_bind(sku.clone());
        }
        if let Some(name) = &data.name {
            qb.push(", name = ");
            qb.push_bind(name.clone());
        }
        if let Some(price_cents) = data.price_cents {
            qb.push(", price_cents = ");
            qb.push_bind(price_cents);
        }
        if let Some(current_stock) = data.current_stock {
            qb.push(", current_stock = ");
            qb.push_bind(current_stock);
        }
        if let Some(is_active) = data.is_active {
            qb.push(", is_active = ");
            qb.push_bind(is_active);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id.to_string());
        qb.build().execute(&self.pool).await?;

        self.find_or_fail(scope, id).await
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Historical sales still reference the product, and mistakes can be
    /// undone. Same scoped-resolve-then-mutate pattern as `update`.
    pub async fn delete(&self, scope: &AccessScope, id: &str) -> DbResult<bool> {
        self.find_or_fail(scope, id).await?;

        debug!(id = %id, "Soft-deleting product");

        sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(true)
    }
}

//! # Sale Repository
//!
//! Scoped database operations for sales.
//!
//! Sales are the strict-branch case: every sale is recorded at a till, so
//! `branch_id` is never NULL and visibility requires the branch itself to be
//! in the caller's accessible set. An accessible shop alone is NOT enough to
//! see another branch's sales.
//!
//! ## Atomic Recording
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     record_sale transaction                             │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── INSERT INTO sales (status = completed)                           │
//! │   ├── UPDATE products SET current_stock = current_stock - qty          │
//! │   │        └── 0 rows? ──► ROLLBACK, NotFound                          │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  The caller sees either full success or a rolled-back no-op;           │
//! │  a sale without its stock decrement never survives.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use duka_core::device::DeviceClass;
use duka_core::pagination::{CursorPage, OffsetPage, Page, PaginationConfig};
use duka_core::types::{NewSale, Sale, SaleStatus};

use crate::error::{DbError, DbResult};
use crate::repository::query::{FilterValue, PageRequest, ScopedQuery, ScopedRow};
use crate::scope::{AccessScope, ScopeMode};

const TABLE: &str = "sales";
const ENTITY: &str = "Sale";

impl ScopedRow for Sale {
    fn row_id(&self) -> &str {
        &self.id
    }
}

/// Caller-supplied sale filters, applied after the scope predicate.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub status: Option<SaleStatus>,
    pub cashier_id: Option<String>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    fn query<'a>(&self, scope: &'a AccessScope, filter: SaleFilter) -> ScopedQuery<'a> {
        let mut query = ScopedQuery::new(TABLE, ScopeMode::Branch, scope);
        if let Some(status) = filter.status {
            let status = match status {
                SaleStatus::Draft => "draft",
                SaleStatus::Completed => "completed",
                SaleStatus::Voided => "voided",
            };
            query = query.filter("status", FilterValue::Text(status.to_string()));
        }
        if let Some(cashier_id) = filter.cashier_id {
            query = query.filter("cashier_id", FilterValue::Text(cashier_id));
        }
        query
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Full scoped result, unpaginated. Small/internal sets only.
    pub async fn all(&self, scope: &AccessScope, filter: SaleFilter) -> DbResult<Vec<Sale>> {
        self.query(scope, filter).fetch_all(&self.pool).await
    }

    /// Offset page, forced regardless of device class.
    pub async fn paginate(
        &self,
        scope: &AccessScope,
        config: &PaginationConfig,
        device: DeviceClass,
        request: &PageRequest,
        filter: SaleFilter,
    ) -> DbResult<OffsetPage<Sale>> {
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
        filter: SaleFilter,
    ) -> DbResult<CursorPage<Sale>> {
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
        filter: SaleFilter,
    ) -> DbResult<Page<Sale>> {
        self.query(scope, filter)
            .auto_paginate(&self.pool, config, device, request)
            .await
    }

    /// Scoped lookup. Absent and inaccessible are indistinguishable.
    pub async fn find(&self, scope: &AccessScope, id: &str) -> DbResult<Option<Sale>> {
        self.query(scope, SaleFilter::default())
            .find(&self.pool, id)
            .await
    }

    /// Scoped lookup raising the collapsed NotFound.
    pub async fn find_or_fail(&self, scope: &AccessScope, id: &str) -> DbResult<Sale> {
        self.query(scope, SaleFilter::default())
            .find_or_fail(&self.pool, ENTITY, id)
            .await
    }

    /// Scoped count.
    pub async fn count(&self, scope: &AccessScope, filter: SaleFilter) -> DbResult<i64> {
        self.query(scope, filter).count(&self.pool).await
    }

    /// Scoped existence check.
    pub async fn exists(&self, scope: &AccessScope, id: &str) -> DbResult<bool> {
        self.query(scope, SaleFilter::default())
            .exists(&self.pool, id)
            .await
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Records a completed sale and decrements the product's stock in one
    /// transaction.
    ///
    /// Partial application is not acceptable: on any failure the whole unit
    /// rolls back and the caller sees a no-op plus the error.
    ///
    /// `data.shop_id`/`data.branch_id` are expected to already be verified
    /// as accessible by the calling collaborator.
    pub async fn record_sale(&self, data: NewSale) -> DbResult<Sale> {
        let now = Utc::now();
        let receipt_number = generate_receipt_number(&branch_code(&data.branch_id));
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            shop_id: data.shop_id,
            branch_id: data.branch_id,
            receipt_number,
            status: SaleStatus::Completed,
            total_cents: data.total_cents,
            cashier_id: data.cashier_id,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Recording sale");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, shop_id, branch_id, receipt_number, status,
                total_cents, cashier_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.shop_id)
        .bind(&sale.branch_id)
        .bind(&sale.receipt_number)
        .bind(sale.status)
        .bind(sale.total_cents)
        .bind(&sale.cashier_id)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        // Delta update keeps concurrent tills additive
        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = COALESCE(current_stock, 0) - ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&data.product_id)
        .bind(data.quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Err(DbError::not_found("Product", &data.product_id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(sale)
    }

    /// Voids a sale.
    ///
    /// Scoped resolve first, then the status guard: only draft or completed
    /// sales can be voided.
    pub async fn void_sale(&self, scope: &AccessScope, id: &str) -> DbResult<()> {
        self.find_or_fail(scope, id).await?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET status = 'voided', updated_at = ?2
            WHERE id = ?1 AND status IN ('draft', 'completed')
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Hard-deletes a sale after the scoped resolve.
    pub async fn delete(&self, scope: &AccessScope, id: &str) -> DbResult<bool> {
        self.query(scope, SaleFilter::default())
            .delete(&self.pool, ENTITY, id)
            .await
    }
}

/// Generates a receipt number in format: YYYYMMDD-CC-NNNN
///
/// ## Format
/// - YYYYMMDD: Date
/// - CC: Branch code (last 2 chars of the branch id)
/// - NNNN: Sequence (padded to 4 digits)
fn generate_receipt_number(branch_code: &str) -> String {
    let now = Utc::now();
    let date_part = now.format("%Y%m%d");

    // TODO: replace the millisecond sequence with a per-branch daily counter
    let seq = (now.timestamp_millis() % 10000) as u32;

    format!("{}-{}-{:04}", date_part, branch_code, seq)
}

/// Last two characters of an id, or "00" when too short.
fn branch_code(id: &str) -> String {
    let code: String = id.chars().rev().take(2).collect::<String>().chars().rev().collect();
    if code.len() < 2 {
        "00".to_string()
    } else {
        code
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_number_format() {
        let receipt = generate_receipt_number("b7");
        let parts: Vec<&str> = receipt.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1], "b7");
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_branch_code_short_id() {
        assert_eq!(branch_code("x"), "00");
        assert_eq!(branch_code("branch-42"), "42");
    }
}

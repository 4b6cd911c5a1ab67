//! # Scoped Query Primitives
//!
//! The generic read/pagination surface shared by every repository. A
//! [`ScopedQuery`] bundles a table, the scope mode for that table, the
//! caller's [`AccessScope`] and any repository-supplied filters; every SQL
//! statement it builds starts from the scope predicate, so there is no
//! unscoped path through a repository.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ScopedQuery operations                            │
//! │                                                                         │
//! │  fetch_all ──────────► full result (small/internal sets only)          │
//! │  count / exists ─────► scoped aggregates                               │
//! │  find / find_or_fail ► scoped lookup, absent == inaccessible           │
//! │  delete ─────────────► scoped resolve, then DELETE                     │
//! │                                                                         │
//! │  paginate ───────────► offset page   (forced, ceiling enforced)        │
//! │  cursor_paginate ────► cursor page   (forced, ceiling enforced)        │
//! │  auto_paginate ──────► strategy chosen by the caller's device class    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cursor pagination is a forward keyset on `id`: the page is fetched with
//! `LIMIT n+1` and the extra row only signals that a next page exists.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use duka_core::device::DeviceClass;
use duka_core::pagination::{CursorPage, OffsetPage, Page, PageStrategy, PaginationConfig};

use crate::error::{DbError, DbResult};
use crate::scope::{AccessScope, ScopeMode};

/// Row type usable with the scoped query primitives.
///
/// `row_id` feeds the keyset cursor; every scoped table has a TEXT `id`
/// primary key.
pub trait ScopedRow: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    fn row_id(&self) -> &str;
}

/// A repository-supplied equality filter value.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

/// Caller pagination input, normalized by the validation layer.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// 1-based page index (offset strategy only). 0 means first page.
    pub page: u32,
    /// Requested page size; None applies the class default.
    pub size: Option<u32>,
    /// Opaque cursor from a previous cursor page (cursor strategy only).
    pub cursor: Option<String>,
}

impl PageRequest {
    fn page_or_first(&self) -> u32 {
        self.page.max(1)
    }
}

// =============================================================================
// Scoped Query
// =============================================================================

/// One scoped query against a single table.
///
/// Built fresh per operation by a repository; holds no connection and is
/// discarded after use.
pub struct ScopedQuery<'a> {
    table: &'static str,
    mode: ScopeMode,
    scope: &'a AccessScope,
    order_by: &'static str,
    filters: Vec<(&'static str, FilterValue)>,
}

impl<'a> ScopedQuery<'a> {
    /// Creates a query for `table`, scoped by `mode` for this caller.
    pub fn new(table: &'static str, mode: ScopeMode, scope: &'a AccessScope) -> Self {
        ScopedQuery {
            table,
            mode,
            scope,
            order_by: "id",
            filters: Vec::new(),
        }
    }

    /// Adds a repository-supplied equality filter.
    ///
    /// Column names come from repository code, never from callers.
    pub fn filter(mut self, column: &'static str, value: FilterValue) -> Self {
        self.filters.push((column, value));
        self
    }

    /// Sets the ordering for `fetch_all` and offset pages.
    /// Cursor pages always order by `id` (keyset requirement).
    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = column;
        self
    }

    /// Builds `SELECT <projection> FROM <table> WHERE 1 = 1 AND <scope>
    /// AND <filters...>`.
    fn select_builder(&self, projection: &str) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {projection} FROM {} WHERE 1 = 1",
            self.table
        ));
        self.scope.push_predicate(&mut qb, self.mode);
        for (column, value) in &self.filters {
            qb.push(format!(" AND {column} = "));
            match value {
                FilterValue::Text(v) => qb.push_bind(v.clone()),
                FilterValue::Bool(v) => qb.push_bind(*v),
            };
        }
        qb
    }

    // -------------------------------------------------------------------------
    // Unpaginated reads
    // -------------------------------------------------------------------------

    /// Full scoped result, no pagination.
    ///
    /// Used only for small/internal sets; bounding the size is the caller's
    /// responsibility.
    pub async fn fetch_all<T: ScopedRow>(&self, pool: &SqlitePool) -> DbResult<Vec<T>> {
        let mut qb = self.select_builder("*");
        qb.push(format!(" ORDER BY {}", self.order_by));
        let rows = qb.build_query_as::<T>().fetch_all(pool).await?;
        Ok(rows)
    }

    /// Scoped row count.
    pub async fn count(&self, pool: &SqlitePool) -> DbResult<i64> {
        let mut qb = self.select_builder("COUNT(*)");
        let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
        Ok(count)
    }

    /// Scoped lookup by id. Absent and inaccessible are indistinguishable.
    pub async fn find<T: ScopedRow>(&self, pool: &SqlitePool, id: &str) -> DbResult<Option<T>> {
        let mut qb = self.select_builder("*");
        qb.push(" AND id = ");
        qb.push_bind(id.to_string());
        let row = qb.build_query_as::<T>().fetch_optional(pool).await?;
        Ok(row)
    }

    /// Scoped lookup by id, raising the collapsed NotFound on absence.
    pub async fn find_or_fail<T: ScopedRow>(
        &self,
        pool: &SqlitePool,
        entity: &str,
        id: &str,
    ) -> DbResult<T> {
        self.find(pool, id)
            .await?
            .ok_or_else(|| DbError::not_found(entity, id))
    }

    /// Scoped existence check.
    pub async fn exists(&self, pool: &SqlitePool, id: &str) -> DbResult<bool> {
        let mut qb = self.select_builder("COUNT(*)");
        qb.push(" AND id = ");
        qb.push_bind(id.to_string());
        let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
        Ok(count > 0)
    }

    /// Scoped resolve, then hard DELETE.
    ///
    /// The existence check runs with the scope applied, so no delete can
    /// touch an inaccessible row.
    pub async fn delete(&self, pool: &SqlitePool, entity: &str, id: &str) -> DbResult<bool> {
        if !self.exists(pool, id).await? {
            return Err(DbError::not_found(entity, id));
        }

        debug!(table = self.table, id = %id, "Deleting row");

        let mut qb = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {} WHERE id = ", self.table));
        qb.push_bind(id.to_string());
        qb.build().execute(pool).await?;
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Offset pagination, forced regardless of device class.
    ///
    /// The size ceiling of the caller's class still applies.
    pub async fn paginate<T: ScopedRow>(
        &self,
        pool: &SqlitePool,
        config: &PaginationConfig,
        device: DeviceClass,
        request: &PageRequest,
    ) -> DbResult<OffsetPage<T>> {
        let per_page = config.resolve_page_size(device, request.size);
        let page = request.page_or_first();
        let total = self.count(pool).await?;

        let mut qb = self.select_builder("*");
        qb.push(format!(" ORDER BY {} LIMIT ", self.order_by));
        qb.push_bind(per_page as i64);
        qb.push(" OFFSET ");
        qb.push_bind(((page - 1) as i64) * per_page as i64);

        let items = qb.build_query_as::<T>().fetch_all(pool).await?;

        debug!(
            table = self.table,
            page,
            per_page,
            total,
            "Offset page fetched"
        );

        Ok(OffsetPage::new(items, page, per_page, total))
    }

    /// Cursor pagination, forced regardless of device class.
    ///
    /// Forward-only keyset on `id`; fetches one extra row to detect whether
    /// a next page exists without a COUNT query.
    pub async fn cursor_paginate<T: ScopedRow>(
        &self,
        pool: &SqlitePool,
        config: &PaginationConfig,
        device: DeviceClass,
        request: &PageRequest,
    ) -> DbResult<CursorPage<T>> {
        let per_page = config.resolve_page_size(device, request.size);

        let mut qb = self.select_builder("*");
        if let Some(cursor) = &request.cursor {
            qb.push(" AND id > ");
            qb.push_bind(cursor.clone());
        }
        qb.push(" ORDER BY id LIMIT ");
        qb.push_bind(per_page as i64 + 1);

        let mut items: Vec<T> = qb.build_query_as::<T>().fetch_all(pool).await?;

        let next_cursor = if items.len() > per_page as usize {
            items.truncate(per_page as usize);
            items.last().map(|row| row.row_id().to_string())
        } else {
            None
        };

        debug!(
            table = self.table,
            per_page,
            has_next = next_cursor.is_some(),
            "Cursor page fetched"
        );

        Ok(CursorPage {
            items,
            next_cursor,
            previous_cursor: request.cursor.clone(),
            per_page,
        })
    }

    /// Device-aware pagination: the strategy comes from the descriptor table
    /// for the caller's class. Explicit `paginate`/`cursor_paginate` calls
    /// bypass this selection.
    pub async fn auto_paginate<T: ScopedRow>(
        &self,
        pool: &SqlitePool,
        config: &PaginationConfig,
        device: DeviceClass,
        request: &PageRequest,
    ) -> DbResult<Page<T>> {
        match config.strategy_for(device) {
            PageStrategy::Offset => Ok(Page::Offset(
                self.paginate(pool, config, device, request).await?,
            )),
            PageStrategy::Cursor => Ok(Page::Cursor(
                self.cursor_paginate(pool, config, device, request).await?,
            )),
        }
    }
}

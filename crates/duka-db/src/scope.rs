//! # Scope Filter
//!
//! Rewrites candidate queries so they are restricted to rows the caller may
//! see. Repositories never run an unscoped query; the scope is injected as a
//! value, not inherited behavior, so no repository can forget or bypass it.
//!
//! ## The Empty-Set Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            Empty accessible set must match ZERO rows                    │
//! │                                                                         │
//! │  accessible shops = {}                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  naive:    WHERE shop_id IN ()      ← SQL error, or worse:             │
//! │                                       some builders emit no predicate  │
//! │                                       and match EVERYTHING             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  here:     WHERE 0 = 1              ← matches nothing, always          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Two-Leg Fallback
//! Shop-level entities (nullable `branch_id`) are visible through either leg:
//!
//! ```text
//!   (branch_id IN (accessible branches))
//!   OR (branch_id IS NULL AND shop_id IN (accessible shops))
//! ```
//!
//! Each leg degrades to `0 = 1` independently when its set is empty; the OR
//! can still match through the other leg. With both sets empty the whole
//! predicate matches nothing - tested explicitly, because the two-leg OR is
//! an easy place to accidentally admit unrestricted rows.

use sqlx::{QueryBuilder, Sqlite};

use duka_core::context::Identity;

// =============================================================================
// Scope Mode
// =============================================================================

/// Which accessible set a table is scoped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// `shop_id IN (accessible shops)`.
    Shop,
    /// `branch_id IN (accessible branches)`. For entities that always carry
    /// a branch (e.g. sales).
    Branch,
    /// Branch scope with the shop-level fallback for NULL `branch_id` rows
    /// (e.g. products).
    BranchWithShopFallback,
}

// =============================================================================
// Access Scope
// =============================================================================

/// The caller's accessible shop and branch ID sets for one request.
///
/// Derived, request-scoped, read-only: resolved once per request by
/// [`DirectoryRepository::resolve_scope`](crate::repository::directory::DirectoryRepository::resolve_scope)
/// and passed into every repository call. Never cached across requests.
#[derive(Debug, Clone)]
pub struct AccessScope {
    /// Identity the scope was resolved for (carried for tracing).
    identity: Identity,
    shop_ids: Vec<String>,
    branch_ids: Vec<String>,
}

impl Default for AccessScope {
    fn default() -> Self {
        AccessScope::empty()
    }
}

impl AccessScope {
    /// Builds a scope from resolved sets. IDs are sorted and deduplicated so
    /// the generated SQL is deterministic.
    pub fn new(
        identity: Identity,
        mut shop_ids: Vec<String>,
        mut branch_ids: Vec<String>,
    ) -> Self {
        shop_ids.sort();
        shop_ids.dedup();
        branch_ids.sort();
        branch_ids.dedup();
        AccessScope {
            identity,
            shop_ids,
            branch_ids,
        }
    }

    /// The scope of an anonymous caller: both sets empty, every scoped query
    /// matches zero rows.
    pub fn empty() -> Self {
        AccessScope::new(Identity::Anonymous, Vec::new(), Vec::new())
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn shop_ids(&self) -> &[String] {
        &self.shop_ids
    }

    pub fn branch_ids(&self) -> &[String] {
        &self.branch_ids
    }

    /// True when the given shop is in the accessible set.
    pub fn can_access_shop(&self, shop_id: &str) -> bool {
        self.shop_ids.iter().any(|id| id == shop_id)
    }

    /// True when the given branch is in the accessible set.
    pub fn can_access_branch(&self, branch_id: &str) -> bool {
        self.branch_ids.iter().any(|id| id == branch_id)
    }

    // -------------------------------------------------------------------------
    // Predicate builders
    // -------------------------------------------------------------------------

    /// Appends ` AND <scope predicate>` for the given mode.
    ///
    /// The surrounding query must already have a WHERE clause (repositories
    /// start from `WHERE 1 = 1`).
    pub fn push_predicate(&self, qb: &mut QueryBuilder<'_, Sqlite>, mode: ScopeMode) {
        qb.push(" AND ");
        match mode {
            ScopeMode::Shop => self.push_shop_leg(qb),
            ScopeMode::Branch => self.push_branch_leg(qb),
            ScopeMode::BranchWithShopFallback => {
                qb.push("(");
                self.push_branch_leg(qb);
                qb.push(" OR (branch_id IS NULL AND ");
                self.push_shop_leg(qb);
                qb.push("))");
            }
        }
    }

    fn push_shop_leg(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_in_clause(qb, "shop_id", &self.shop_ids);
    }

    fn push_branch_leg(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_in_clause(qb, "branch_id", &self.branch_ids);
    }
}

/// Appends `column IN (?, ?, ...)`, or `0 = 1` for an empty set.
///
/// An empty IN-list must never default to unrestricted.
fn push_in_clause(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, ids: &[String]) {
    if ids.is_empty() {
        qb.push("0 = 1");
        return;
    }

    qb.push(column);
    qb.push(" IN (");
    {
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
    }
    qb.push(")");
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Tenant Directory
//!
//! Resolves which shops and branches a caller may access, and answers the
//! non-leaking `verify_*` lookups. Also owns the shop/branch/membership
//! writes, so the whole tenancy surface lives in one place.
//!
//! ## Accessible Sets
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How access is derived                                │
//! │                                                                         │
//! │  accessible shops(u)   = shops owned by u                              │
//! │                        ∪ shops where u has an ACTIVE membership        │
//! │                                                                         │
//! │  accessible branches(u)= branches under accessible shops(u)            │
//! │                        ∪ branches with an explicit assignment for u    │
//! │                                                                         │
//! │  The assignment leg is independent authority: it survives even when    │
//! │  the user's shop-level membership has been revoked.                    │
//! │                                                                         │
//! │  Anonymous caller ──► both sets empty. Empty results, never errors.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `verify_shop_access`/`verify_branch_access` fail with the collapsed
//! NotFound (never "forbidden"), deliberately not leaking whether an
//! inaccessible id exists.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use duka_core::context::Identity;
use duka_core::types::{Branch, BranchAssignment, MemberRole, Shop, ShopMember};

use crate::error::{DbError, DbResult};
use crate::scope::AccessScope;

/// Repository for the tenancy directory.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    /// Creates a new DirectoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DirectoryRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Accessible sets
    // -------------------------------------------------------------------------

    /// Shops the identity may access: owned ∪ active memberships.
    ///
    /// Read-only, no side effects. Anonymous identities get an empty set,
    /// never an error.
    pub async fn accessible_shop_ids(&self, identity: &Identity) -> DbResult<Vec<String>> {
        let Some(user_id) = identity.user_id() else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM shops WHERE owner_id = ?1
            UNION
            SELECT shop_id FROM shop_members WHERE user_id = ?1 AND is_active = 1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        ids.sort();
        ids.dedup();

        debug!(user_id = %user_id, count = ids.len(), "Resolved accessible shops");
        Ok(ids)
    }

    /// Branches the identity may access, optionally narrowed to one shop.
    ///
    /// The union of branches under accessible shops and branches with an
    /// explicit assignment for this user. The two legs are queried
    /// separately and merged: an assignment must grant access even when the
    /// shop leg yields nothing.
    pub async fn accessible_branch_ids(
        &self,
        identity: &Identity,
        shop_id: Option<&str>,
    ) -> DbResult<Vec<String>> {
        let Some(user_id) = identity.user_id() else {
            return Ok(Vec::new());
        };

        let shop_ids = self.accessible_shop_ids(identity).await?;

        // Leg 1: branches under accessible shops.
        let mut ids: Vec<String> = if shop_ids.is_empty() {
            Vec::new()
        } else {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM branches WHERE shop_id IN (");
            {
                let mut separated = qb.separated(", ");
                for id in &shop_ids {
                    separated.push_bind(id.clone());
                }
            }
            qb.push(")");
            if let Some(shop) = shop_id {
                qb.push(" AND shop_id = ");
                qb.push_bind(shop.to_string());
            }
            qb.build_query_scalar().fetch_all(&self.pool).await?
        };

        // Leg 2: explicit assignments (independent authority).
        let assigned: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT ba.branch_id
            FROM branch_assignments ba
            JOIN branches b ON b.id = ba.branch_id
            WHERE ba.user_id = ?1 AND (?2 IS NULL OR b.shop_id = ?2)
            "#,
        )
        .bind(user_id)
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        ids.extend(assigned);
        ids.sort();
        ids.dedup();

        debug!(user_id = %user_id, count = ids.len(), "Resolved accessible branches");
        Ok(ids)
    }

    /// Resolves the full per-request scope in one call.
    ///
    /// Done once at the start of a request and passed into every repository
    /// operation; never cached across requests.
    pub async fn resolve_scope(&self, identity: &Identity) -> DbResult<AccessScope> {
        let shop_ids = self.accessible_shop_ids(identity).await?;
        let branch_ids = self.accessible_branch_ids(identity, None).await?;
        Ok(AccessScope::new(identity.clone(), shop_ids, branch_ids))
    }

    // -------------------------------------------------------------------------
    // Non-leaking verification
    // -------------------------------------------------------------------------

    /// Returns the shop if the identity may access it.
    ///
    /// Fails with NotFound (not "forbidden") otherwise - an inaccessible
    /// shop and a nonexistent one produce the same error shape.
    pub async fn verify_shop_access(&self, identity: &Identity, shop_id: &str) -> DbResult<Shop> {
        let accessible = self.accessible_shop_ids(identity).await?;
        if !accessible.iter().any(|id| id == shop_id) {
            return Err(DbError::not_found("Shop", shop_id));
        }

        let shop: Option<Shop> = sqlx::query_as("SELECT * FROM shops WHERE id = ?1")
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await?;

        shop.ok_or_else(|| DbError::not_found("Shop", shop_id))
    }

    /// Returns the branch if the identity may access it. Same non-leaking
    /// contract as [`verify_shop_access`](Self::verify_shop_access).
    pub async fn verify_branch_access(
        &self,
        identity: &Identity,
        branch_id: &str,
    ) -> DbResult<Branch> {
        let accessible = self.accessible_branch_ids(identity, None).await?;
        if !accessible.iter().any(|id| id == branch_id) {
            return Err(DbError::not_found("Branch", branch_id));
        }

        let branch: Option<Branch> = sqlx::query_as("SELECT * FROM branches WHERE id = ?1")
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?;

        branch.ok_or_else(|| DbError::not_found("Branch", branch_id))
    }

    // -------------------------------------------------------------------------
    // Shop administration
    // -------------------------------------------------------------------------

    /// Creates a shop owned by the given identity.
    pub async fn create_shop(&self, owner_id: &str, name: &str) -> DbResult<Shop> {
        let now = Utc::now();
        let shop = Shop {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %shop.id, owner_id = %owner_id, "Creating shop");

        sqlx::query(
            r#"
            INSERT INTO shops (id, owner_id, name, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&shop.id)
        .bind(&shop.owner_id)
        .bind(&shop.name)
        .bind(shop.is_active)
        .bind(shop.created_at)
        .bind(shop.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(shop)
    }

    /// Adds a member to a shop with a role.
    pub async fn add_member(
        &self,
        shop_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> DbResult<ShopMember> {
        let member = ShopMember {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.to_string(),
            user_id: user_id.to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(shop_id = %shop_id, user_id = %user_id, "Adding shop member");

        sqlx::query(
            r#"
            INSERT INTO shop_members (id, shop_id, user_id, role, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&member.id)
        .bind(&member.shop_id)
        .bind(&member.user_id)
        .bind(member.role)
        .bind(member.is_active)
        .bind(member.created_at)
        .execute(&self.pool)
        .await?;

        Ok(member)
    }

    /// Revokes a user's shop-level membership.
    ///
    /// Explicit branch assignments are NOT touched: they are independent
    /// authority and keep granting branch access.
    pub async fn deactivate_member(&self, shop_id: &str, user_id: &str) -> DbResult<()> {
        debug!(shop_id = %shop_id, user_id = %user_id, "Deactivating shop member");

        let result = sqlx::query(
            "UPDATE shop_members SET is_active = 0 WHERE shop_id = ?1 AND user_id = ?2",
        )
        .bind(shop_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ShopMember", user_id));
        }

        Ok(())
    }

    /// Creates a branch under a shop.
    ///
    /// The shop never changes afterwards: no update operation for
    /// `branches.shop_id` exists anywhere in this crate.
    pub async fn create_branch(
        &self,
        shop_id: &str,
        name: &str,
        manager_id: Option<&str>,
    ) -> DbResult<Branch> {
        let now = Utc::now();
        let branch = Branch {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.to_string(),
            name: name.to_string(),
            manager_id: manager_id.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %branch.id, shop_id = %shop_id, "Creating branch");

        sqlx::query(
            r#"
            INSERT INTO branches (id, shop_id, name, manager_id, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&branch.id)
        .bind(&branch.shop_id)
        .bind(&branch.name)
        .bind(&branch.manager_id)
        .bind(branch.is_active)
        .bind(branch.created_at)
        .bind(branch.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Explicitly assigns a user to a branch.
    pub async fn assign_branch_member(
        &self,
        branch_id: &str,
        user_id: &str,
    ) -> DbResult<BranchAssignment> {
        let assignment = BranchAssignment {
            id: Uuid::new_v4().to_string(),
            branch_id: branch_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };

        debug!(branch_id = %branch_id, user_id = %user_id, "Assigning branch member");

        sqlx::query(
            r#"
            INSERT INTO branch_assignments (id, branch_id, user_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&assignment.id)
        .bind(&assignment.branch_id)
        .bind(&assignment.user_id)
        .bind(assignment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(assignment)
    }
}

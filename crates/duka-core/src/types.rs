//! # Domain Types
//!
//! Core domain types used throughout Duka.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐       ┌─────────────────┐                         │
//! │  │      Shop       │ 1───* │     Branch      │                         │
//! │  │  ─────────────  │       │  ─────────────  │                         │
//! │  │  id (UUID)      │       │  id (UUID)      │                         │
//! │  │  owner_id       │       │  shop_id (FK)   │  ← never changes        │
//! │  │  name           │       │  manager_id?    │                         │
//! │  └────────┬────────┘       └────────┬────────┘                         │
//! │           │ *                       │ *                                │
//! │  ┌────────▼────────┐       ┌────────▼────────┐                         │
//! │  │   ShopMember    │       │BranchAssignment │  ← independent          │
//! │  │  user_id, role  │       │  user_id        │    authority            │
//! │  └─────────────────┘       └─────────────────┘                         │
//! │                                                                         │
//! │  Scoped entities (always shop_id, branch_id nullable):                 │
//! │  ┌─────────────────┐       ┌─────────────────┐                         │
//! │  │    Product      │       │      Sale       │                         │
//! │  │  branch_id NULL │       │  branch_id SET  │                         │
//! │  │  = shop-level   │       │  = branch-level │                         │
//! │  └─────────────────┘       └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where applicable: (sku, receipt_number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Membership Role
// =============================================================================

/// Role a user holds inside a shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Full control over the shop, short of ownership transfer.
    Admin,
    /// Day-to-day operations (sales, stock).
    Staff,
}

impl Default for MemberRole {
    fn default() -> Self {
        MemberRole::Staff
    }
}

// =============================================================================
// Shop
// =============================================================================

/// A shop is a top-level isolated business account (the tenant).
///
/// Every business record in the system carries a `shop_id`, and a caller can
/// only see rows whose shop is in their accessible set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shop {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Identity that registered the shop. Exactly one owner.
    pub owner_id: String,

    /// Display name.
    pub name: String,

    /// Whether the shop is active (soft delete is a collaborator concern,
    /// the flag is carried for them).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A membership record tying a user to a shop with a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShopMember {
    pub id: String,
    pub shop_id: String,
    pub user_id: String,
    pub role: MemberRole,
    /// Inactive memberships grant no access.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Branch
// =============================================================================

/// A branch is a shop's internal subdivision.
///
/// Invariant: a branch's `shop_id` never changes after creation. There is
/// deliberately no operation anywhere in this workspace that updates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: String,

    /// Owning shop. Immutable.
    pub shop_id: String,

    pub name: String,

    /// Optional manager identity.
    pub manager_id: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An explicit user-to-branch assignment.
///
/// Assignments are independent authority: a user assigned to a branch keeps
/// seeing that branch even if their shop-level membership is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BranchAssignment {
    pub id: String,
    pub branch_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Products may be shop-level (`branch_id = NULL`, visible through the
/// shop-fallback scope) or pinned to a single branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shop this product belongs to.
    pub shop_id: String,

    /// NULL means shop-level: the product is not specific to any branch.
    pub branch_id: Option<String>,

    /// Stock Keeping Unit - business identifier, unique per shop.
    pub sku: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level. None when inventory is not tracked.
    pub current_stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    /// Must already be verified as accessible by the caller; the repository
    /// does not independently re-check create-time shop ownership.
    pub shop_id: String,
    pub branch_id: Option<String>,
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub current_stock: Option<i64>,
}

/// Fields that can be updated on an existing product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub current_stock: Option<i64>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale is in progress (items being added).
    Draft,
    /// Sale has been paid and finalized.
    Completed,
    /// Sale was cancelled/refunded.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Draft
    }
}

/// A completed or in-progress sale transaction.
///
/// Sales are always branch-level: they are recorded at a till, so
/// `branch_id` is never NULL and the strict branch scope applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub shop_id: String,
    pub branch_id: String,
    pub receipt_number: String,
    pub status: SaleStatus,
    pub total_cents: i64,
    /// Cashier who recorded the sale.
    pub cashier_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to record a new sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub shop_id: String,
    pub branch_id: String,
    pub cashier_id: String,
    pub total_cents: i64,
    /// Product whose stock the sale consumes, with quantity.
    /// The stock decrement happens in the same transaction as the insert.
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

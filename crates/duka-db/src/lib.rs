//! # duka-db: Database Layer for Duka
//!
//! This crate provides scoped database access for the Duka backend.
//! It uses SQLite with sqlx for async operations; every query a repository
//! runs is narrowed to the caller's accessible shops and branches.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Duka Data Flow                                  │
//! │                                                                         │
//! │  Feature Controller (list products, record sale, ...)                  │
//! │       │  RequestContext { identity, device }                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     duka-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Directory   │    │  Scope Filter │    │ Repositories │  │   │
//! │  │   │(directory.rs) │───►│  (scope.rs)   │───►│ (product.rs, │  │   │
//! │  │   │               │    │               │    │  sale.rs)    │  │   │
//! │  │   │ accessible    │    │ AccessScope   │    │ ScopedQuery  │  │   │
//! │  │   │ shops/branches│    │ predicates    │    │ + pagination │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types (including the collapsed NotFound)
//! - [`scope`] - AccessScope and the scope predicates
//! - [`repository`] - Scoped repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duka_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/duka.db")).await?;
//!
//! // Resolve the caller's scope once per request
//! let scope = db.directory().resolve_scope(&identity).await?;
//!
//! // Every repository call is narrowed to that scope
//! let page = db
//!     .products()
//!     .auto_paginate(&scope, &config.pagination, ctx.device, &request, filter)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod scope;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use scope::{AccessScope, ScopeMode};

// Repository re-exports for convenience
pub use repository::directory::DirectoryRepository;
pub use repository::product::{ProductFilter, ProductRepository};
pub use repository::query::{FilterValue, PageRequest, ScopedQuery, ScopedRow};
pub use repository::sale::{SaleFilter, SaleRepository};

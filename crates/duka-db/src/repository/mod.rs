//! # Repository Module
//!
//! Scoped repository implementations for Duka.
//!
//! ## Scoped Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Scoped Repository Pattern Explained                     │
//! │                                                                         │
//! │  Feature Controller (external)                                         │
//! │       │                                                                 │
//! │       │  1. scope = db.directory().resolve_scope(&identity)            │
//! │       │  2. db.products().auto_paginate(&scope, ...)                   │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │       │                                                                 │
//! │       │  ScopedQuery(table, mode, &scope)                              │
//! │       ▼                                                                 │
//! │  SELECT ... WHERE 1 = 1                                                │
//! │             AND (branch_id IN (...) OR                                 │
//! │                  (branch_id IS NULL AND shop_id IN (...)))             │
//! │             AND <caller filters>                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The scope is an injected value, not inherited behavior: there is      │
//! │  no code path from a repository to SQL that skips it.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`directory::DirectoryRepository`] - Tenancy: shops, branches,
//!   memberships, accessible sets, non-leaking verification
//! - [`product::ProductRepository`] - Products (shop-fallback scope)
//! - [`sale::SaleRepository`] - Sales (strict branch scope) and the atomic
//!   record-sale transaction

pub mod directory;
pub mod product;
pub mod query;
pub mod sale;

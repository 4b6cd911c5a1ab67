//! # duka-core: Pure Domain Logic for Duka
//!
//! This crate is the **heart** of the Duka backend. It contains the domain
//! types and the access-scoping/pagination rules as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Duka Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Feature Controllers (external)                 │   │
//! │  │    products, sales, credits, payments, subscriptions, ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ RequestContext per request             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ duka-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  device   │  │pagination │  │ validation│  │   │
//! │  │   │   Shop    │  │ classify  │  │ strategy  │  │   rules   │  │   │
//! │  │   │  Branch   │  │  tablet>  │  │ size caps │  │  checks   │  │   │
//! │  │   │  Product  │  │  mobile   │  │page shapes│  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    duka-db (Database Layer)                     │   │
//! │  │        Tenant directory, scope filter, scoped repositories      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Shop, Branch, Product, Sale, etc.)
//! - [`context`] - Caller identity and per-request context
//! - [`device`] - Device classification from a request header
//! - [`pagination`] - Pagination strategy selection and page shapes
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//! - [`config`] - Startup configuration (env with defaults)
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Context**: identity and device class are parameters, never
//!    a hidden request-global
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use duka_core::device::{DeviceClass, DeviceDetectConfig};
//! use duka_core::pagination::{PageStrategy, PaginationConfig};
//!
//! let detect = DeviceDetectConfig::default();
//! let class = detect.classify(Some("Mozilla/5.0 (iPad; CPU OS 16_0)"));
//! assert_eq!(class, DeviceClass::Tablet);
//!
//! let pagination = PaginationConfig::default();
//! // Requested sizes are capped at the class ceiling
//! assert_eq!(pagination.resolve_page_size(DeviceClass::Mobile, Some(5000)), 50);
//! assert_eq!(pagination.strategy_for(DeviceClass::Mobile), PageStrategy::Cursor);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use duka_core::DeviceClass` instead of
// `use duka_core::device::DeviceClass`

pub use config::{ConfigError, DukaConfig};
pub use context::{Identity, RequestContext};
pub use device::{DeviceClass, DeviceDetectConfig};
pub use error::{ValidationError, ValidationResult};
pub use pagination::{CursorPage, OffsetPage, Page, PageDescriptor, PageStrategy, PaginationConfig};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length for shop and branch names.
///
/// ## Business Reason
/// Keeps receipts and statements printable; matches the column width used
/// by the fiscal-log exporters downstream.
pub const MAX_NAME_LENGTH: usize = 120;

/// Hard ceiling on any page size, regardless of device class configuration.
///
/// ## Business Reason
/// A misconfigured descriptor table must never let a single request pull an
/// unbounded slice of a tenant's data.
pub const ABSOLUTE_MAX_PAGE_SIZE: u32 = 500;

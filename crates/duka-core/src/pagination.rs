//! # Pagination Strategy and Page Shapes
//!
//! Maps a device class to a pagination descriptor, enforces the per-class
//! size ceiling, and defines the two mutually exclusive page shapes.
//!
//! ## Strategy Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Device-Aware Pagination                              │
//! │                                                                         │
//! │  RequestContext { device: Mobile }                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PaginationConfig.descriptor_for(Mobile)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PageDescriptor { default: 20, max: 50, strategy: Cursor }             │
//! │       │                                                                 │
//! │       ├── auto_paginate ──► cursor page (infinite scroll UIs)          │
//! │       │                                                                 │
//! │       └── explicit paginate() ──► offset page anyway                   │
//! │           (override preserved: some screens need a page count          │
//! │            even on a mobile class)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Page Shapes
//! - [`OffsetPage`]: carries `total`/`last_page` (costs a COUNT query)
//! - [`CursorPage`]: carries `next_cursor` only (cheap keyset scan)
//!
//! Callers distinguish the shapes structurally: only the offset shape has a
//! `total` field.

use serde::{Deserialize, Serialize};

use crate::device::DeviceClass;
use crate::ABSOLUTE_MAX_PAGE_SIZE;

// =============================================================================
// Strategy
// =============================================================================

/// Which pagination primitive to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStrategy {
    /// LIMIT/OFFSET with a COUNT for totals. Web default.
    Offset,
    /// Forward keyset on the row id. Mobile/tablet default.
    Cursor,
}

// =============================================================================
// Descriptor
// =============================================================================

/// Per device-class pagination configuration tuple.
///
/// Immutable after startup; never created or mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Page size when the caller doesn't request one.
    pub default_page_size: u32,
    /// Ceiling on requested sizes. Callers can never exceed this.
    pub max_page_size: u32,
    /// Strategy `auto_paginate` uses for this class.
    pub strategy: PageStrategy,
}

impl PageDescriptor {
    /// Creates a descriptor.
    pub const fn new(default_page_size: u32, max_page_size: u32, strategy: PageStrategy) -> Self {
        PageDescriptor {
            default_page_size,
            max_page_size,
            strategy,
        }
    }
}

// =============================================================================
// Configuration Table
// =============================================================================

/// The per-class descriptor table, loaded once at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub web: PageDescriptor,
    pub mobile: PageDescriptor,
    pub tablet: PageDescriptor,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            // Web keeps offset pagination so page counts stay available.
            web: PageDescriptor::new(25, 100, PageStrategy::Offset),
            // Small screens get cursor pages for cheap "load more" UIs.
            mobile: PageDescriptor::new(20, 50, PageStrategy::Cursor),
            tablet: PageDescriptor::new(25, 75, PageStrategy::Cursor),
        }
    }
}

impl PaginationConfig {
    /// Pure lookup of the descriptor for a class.
    pub fn descriptor_for(&self, class: DeviceClass) -> &PageDescriptor {
        match class {
            DeviceClass::Web => &self.web,
            DeviceClass::Mobile => &self.mobile,
            DeviceClass::Tablet => &self.tablet,
        }
    }

    /// Resolves the effective page size for a request.
    ///
    /// ## Rules
    /// - `requested` absent: the class default
    /// - otherwise `min(requested, max_page_size)` - the ceiling always wins
    /// - everything is additionally capped at [`ABSOLUTE_MAX_PAGE_SIZE`]
    ///
    /// Zero/negative requested sizes are normalized to "absent" before this
    /// call (see [`crate::validation::normalize_page_size`]).
    pub fn resolve_page_size(&self, class: DeviceClass, requested: Option<u32>) -> u32 {
        let descriptor = self.descriptor_for(class);
        let size = match requested {
            Some(size) => size.min(descriptor.max_page_size),
            None => descriptor.default_page_size,
        };
        size.min(ABSOLUTE_MAX_PAGE_SIZE)
    }

    /// Strategy `auto_paginate` should use for a class.
    ///
    /// Explicit `paginate()`/`cursor_paginate()` calls bypass this lookup.
    pub fn strategy_for(&self, class: DeviceClass) -> PageStrategy {
        self.descriptor_for(class).strategy
    }
}

// =============================================================================
// Page Shapes
// =============================================================================

/// An offset-paginated result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    /// 1-based page index.
    pub current_page: u32,
    /// Last page index (at least 1, even for empty results).
    pub last_page: u32,
    pub per_page: u32,
    /// Total matching rows across all pages.
    pub total: i64,
}

impl<T> OffsetPage<T> {
    /// Builds a page, deriving `last_page` from the total.
    pub fn new(items: Vec<T>, current_page: u32, per_page: u32, total: i64) -> Self {
        let last_page = if total <= 0 || per_page == 0 {
            1
        } else {
            ((total as u64).div_ceil(per_page as u64)) as u32
        };
        OffsetPage {
            items,
            current_page,
            last_page,
            per_page,
            total,
        }
    }
}

/// A cursor-paginated result. Note: no `total` field, by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    /// Opaque cursor for the next page; None when this is the last page.
    pub next_cursor: Option<String>,
    /// The cursor this page was requested with; None on the first page.
    pub previous_cursor: Option<String>,
    pub per_page: u32,
}

/// The result of `auto_paginate`: one of the two shapes.
///
/// Serialized untagged so the wire shape is exactly the inner page; clients
/// detect which they got by the presence/absence of `total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Offset(OffsetPage<T>),
    Cursor(CursorPage<T>),
}

impl<T> Page<T> {
    /// The items on this page, whichever shape it is.
    pub fn items(&self) -> &[T] {
        match self {
            Page::Offset(page) => &page.items,
            Page::Cursor(page) => &page.items,
        }
    }

    pub fn is_offset(&self) -> bool {
        matches!(self, Page::Offset(_))
    }

    pub fn is_cursor(&self) -> bool {
        matches!(self, Page::Cursor(_))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

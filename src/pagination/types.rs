//! Pagination types
//!
//! Cursor-based pagination primitives shared by every list operation.

use serde::{Deserialize, Serialize};

/// Options for list operations.
///
/// `after` is an opaque server-issued cursor; the iterator overwrites it
/// between pages while leaving `limit` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of items per page.
    pub limit: Option<u32>,
    /// Cursor to resume from (empty string is treated as absent).
    pub after: Option<String>,
}

impl ListOptions {
    /// Create options with a page-size limit (values below 1 are
    /// clamped to 1).
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit.max(1)),
            after: None,
        }
    }

    /// Set the resume cursor.
    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }
}

/// Pagination metadata attached to a page.
///
/// Invariant: when `has_more` is true, `next_cursor` must be a non-empty
/// string. The iterator surfaces a violation as a protocol error rather
/// than looping or silently stopping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Opaque cursor for the next page, if any.
    pub next_cursor: Option<String>,
    /// Whether the server reports further pages.
    pub has_more: bool,
}

impl PageInfo {
    /// Build page info from an optional cursor, deriving `has_more`
    /// the way the API reports it (present non-empty cursor = more pages).
    pub fn from_cursor(next_cursor: Option<String>) -> Self {
        let has_more = next_cursor.as_deref().is_some_and(|c| !c.is_empty());
        Self {
            next_cursor,
            has_more,
        }
    }
}

/// One page of a paginated result set.
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    /// Items in page order.
    pub items: Vec<T>,
    /// Pagination metadata.
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Create a page from items and an optional next cursor.
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            page_info: PageInfo::from_cursor(next_cursor),
        }
    }
}

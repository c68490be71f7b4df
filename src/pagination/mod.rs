//! Cursor-based pagination
//!
//! # Overview
//!
//! Every list endpoint returns one [`Page`] of items plus [`PageInfo`]
//! with an opaque next cursor. [`PageIter`] walks all pages lazily,
//! guarding against servers that report more pages without a cursor or
//! that return a cursor that does not advance.

mod iter;
mod types;

pub use iter::{PageFetcher, PageIter};
pub use types::{ListOptions, Page, PageInfo};

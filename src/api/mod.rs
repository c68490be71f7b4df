//! Per-resource API services
//!
//! Each service borrows the [`Client`](crate::Client) and exposes the
//! operations of one resource family. Services are created through the
//! client accessors (`client.assessments()`, `client.assets()`, ...)
//! and are free to construct on every call.
//!
//! `list_*` operations fetch a single page; the `all_*` variants return
//! a [`PageIter`](crate::pagination::PageIter) that fetches pages on
//! demand.

pub mod assessments;
pub mod assets;
pub mod findings;
pub mod meta;
pub mod organizations;
pub mod reports;
pub mod webhooks;

pub use assessments::AssessmentsService;
pub use assets::AssetsService;
pub use findings::FindingsService;
pub use meta::MetaService;
pub use organizations::OrganizationsService;
pub use reports::ReportsService;
pub use webhooks::WebhooksService;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pagination::{ListOptions, Page};

/// Wire shape of every list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl<T> ListResponse<T> {
    pub(crate) fn into_page(self) -> Page<T> {
        Page::new(self.items, self.next_cursor)
    }
}

/// Reject empty resource identifiers before a request is issued.
pub(crate) fn require_id(id: &str, what: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::invalid_request(format!("{what} is required")));
    }
    Ok(())
}

/// Cursor pagination query parameters for a page fetch.
pub(crate) fn list_query(opts: &ListOptions) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(limit) = opts.limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(after) = &opts.after {
        if !after.is_empty() {
            query.push(("after", after.clone()));
        }
    }
    query
}

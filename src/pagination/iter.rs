//! Lazy cursor-pagination iterator
//!
//! Turns a single-page fetch closure into a lazy sequence of items with
//! loop-guard protection against misbehaving servers. The iterator never
//! prefetches: a page is requested only when the previous page's items
//! have been fully consumed.

use std::collections::VecDeque;

use futures::future::BoxFuture;
use futures::stream::Stream;
use tracing::debug;

use super::types::{ListOptions, Page};
use crate::error::{Error, Result};

/// A boxed single-page fetch operation.
pub type PageFetcher<'a, T> = Box<dyn FnMut(ListOptions) -> BoxFuture<'a, Result<Page<T>>> + Send + 'a>;

/// What the iterator does once the current page's items are drained.
enum Step {
    /// Fetch the next page.
    Fetch,
    /// Sequence finished normally.
    Stop,
    /// Yield this terminal error, then stop.
    Fail(Error),
}

/// Lazy iterator over all items of a cursor-paginated list operation.
///
/// Created by the `all_*` methods on the resource services. Items are
/// yielded in strict page-then-within-page order; a fetch or protocol
/// error terminates the sequence. Restart by creating a new iterator
/// (optionally resuming via [`ListOptions::after`]).
///
/// ```rust,ignore
/// let mut findings = client.findings().all_by_asset("asset-1", None);
/// while let Some(finding) = findings.next().await {
///     println!("{}", finding?.name);
/// }
/// ```
pub struct PageIter<'a, T> {
    fetch: PageFetcher<'a, T>,
    limit: Option<u32>,
    cursor: String,
    buffer: VecDeque<T>,
    step: Step,
    pages_fetched: u64,
}

impl<'a, T> PageIter<'a, T> {
    /// Create an iterator from caller options and a page-fetch closure.
    pub fn new(opts: Option<ListOptions>, fetch: PageFetcher<'a, T>) -> Self {
        let opts = opts.unwrap_or_default();
        Self {
            fetch,
            limit: opts.limit,
            cursor: opts.after.unwrap_or_default(),
            buffer: VecDeque::new(),
            step: Step::Fetch,
            pages_fetched: 0,
        }
    }

    /// Yield the next item, fetching a page only when needed.
    ///
    /// Returns `None` once the sequence is exhausted. After an `Err` item
    /// the sequence is over; subsequent calls return `None`.
    pub async fn next(&mut self) -> Option<Result<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }

            match std::mem::replace(&mut self.step, Step::Stop) {
                Step::Stop => return None,
                Step::Fail(err) => return Some(Err(err)),
                Step::Fetch => {}
            }

            let opts = ListOptions {
                limit: self.limit,
                after: if self.cursor.is_empty() {
                    None
                } else {
                    Some(self.cursor.clone())
                },
            };

            let page = match (self.fetch)(opts).await {
                Ok(page) => page,
                // step is already Stop, so the error is terminal.
                Err(err) => return Some(Err(err)),
            };

            self.pages_fetched += 1;
            debug!(
                page = self.pages_fetched,
                items = page.items.len(),
                has_more = page.page_info.has_more,
                "fetched page"
            );

            self.buffer = page.items.into();

            if !page.page_info.has_more {
                continue; // drain the buffer, then Stop
            }

            match page.page_info.next_cursor.as_deref() {
                None | Some("") => {
                    self.step = Step::Fail(Error::MissingCursor);
                }
                Some(next) if next == self.cursor => {
                    self.step = Step::Fail(Error::CursorNotAdvancing);
                }
                Some(next) => {
                    self.cursor = next.to_string();
                    self.step = Step::Fetch;
                }
            }
        }
    }

    /// Drain the sequence into a vector.
    ///
    /// Partial results are preserved alongside the first error encountered
    /// rather than being discarded.
    pub async fn collect(mut self) -> (Vec<T>, Option<Error>) {
        let mut items = Vec::new();
        while let Some(next) = self.next().await {
            match next {
                Ok(item) => items.push(item),
                Err(err) => return (items, Some(err)),
            }
        }
        (items, None)
    }

    /// Adapt the iterator into a [`futures::Stream`] of results.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send + 'a
    where
        T: Send + 'a,
    {
        futures::stream::unfold(self, |mut iter| async move {
            iter.next().await.map(|item| (item, iter))
        })
    }
}

impl<T> std::fmt::Debug for PageIter<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageIter")
            .field("limit", &self.limit)
            .field("buffered", &self.buffer.len())
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}

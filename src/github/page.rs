//! Lazily-fetched pages of a remote collection.
//!
//! A [`Page`] holds one batch of items plus a deferred fetch for the batch
//! after it. Nothing is prefetched: the next request is only issued when the
//! consumer calls [`Page::next`], which keeps traversal forward-only and paced
//! by whoever is draining the sequence.

use futures::future::BoxFuture;
use std::fmt;

use crate::github::error::Result;

/// Future produced by a page continuation
pub type PageFuture<T> = BoxFuture<'static, Result<Option<Page<T>>>>;

type Continuation<T> = Box<dyn FnOnce() -> PageFuture<T> + Send + Sync>;

/// One page of a paginated collection
pub struct Page<T> {
    items: Vec<T>,
    next: Option<Continuation<T>>,
}

impl<T: Send + 'static> Page<T> {
    /// A page whose successor is fetched by `next` when requested
    pub fn new<F>(items: Vec<T>, next: F) -> Self
    where
        F: FnOnce() -> PageFuture<T> + Send + Sync + 'static,
    {
        Self {
            items,
            next: Some(Box::new(next)),
        }
    }

    /// A terminal page with no successor
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Items on this page only
    pub fn content(&self) -> &[T] {
        &self.items
    }

    /// Fetch the following page, or `None` once the collection is exhausted
    ///
    /// Issues at most one request.
    pub async fn next(self) -> Result<Option<Page<T>>> {
        match self.next {
            Some(fetch) => fetch().await,
            None => Ok(None),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Page<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("items", &self.items)
            .field("has_next", &self.next.is_some())
            .finish()
    }
}

/// Drain every page starting at `first`, collecting all items in order
///
/// A missing first page is treated as an empty collection.
#[cfg(test)]
pub async fn collect_all<T: Send + 'static>(first: Option<Page<T>>) -> Result<Vec<T>> {
    let mut all = Vec::new();
    let mut page = first;
    while let Some(current) = page {
        let next = current.next.map(|fetch| fetch());
        all.extend(current.items);
        page = match next {
            Some(fetch) => fetch.await?,
            None => None,
        };
    }
    Ok(all)
}

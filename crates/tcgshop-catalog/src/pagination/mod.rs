//! Cursor-driven accumulation of search pages for infinite-scroll listings.
//!
//! [`PageFeed`] is the synchronous state machine; [`spawn_feed`] runs one in
//! a tokio task that owns it and talks to callers over channels.

mod debounce;
mod feed;
mod task;

use std::future::Future;

use tcgshop_core::{CatalogPage, SortOrder, StockFilter};

use crate::error::CatalogError;

pub use debounce::Debouncer;
pub use feed::{FeedOutcome, PageFeed, PageTicket};
pub use task::{spawn_feed, FeedClosed, FeedEvent, FeedHandle, FeedSnapshot};

/// Identifies one independent result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchParams {
    /// Free-text search term; blank means no search.
    pub search: Option<String>,
    pub stock: StockFilter,
    pub sort: SortOrder,
}

impl SearchParams {
    /// The search term with surrounding whitespace removed, if non-blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Upstream source of normalized search pages.
pub trait PageSource: Send + Sync + 'static {
    /// Fetches the page at `cursor` (`None` = first page) for `params`.
    fn fetch_page(
        &self,
        params: &SearchParams,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<CatalogPage, CatalogError>> + Send;
}

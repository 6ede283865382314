use tcgshop_core::{CatalogPage, NormalizedCatalogItem};

use crate::error::CatalogError;

use super::SearchParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Fetching,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    /// Nothing fetched yet for the current generation.
    Start,
    Next(String),
    Exhausted,
}

/// Everything needed to issue one upstream page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub generation: u64,
    pub params: SearchParams,
    pub cursor: Option<String>,
}

/// Result of handing a completed request back to the feed.
#[derive(Debug)]
pub enum FeedOutcome {
    Appended { added: usize, has_more: bool },
    /// The page request failed; accumulated items are unchanged.
    Failed(CatalogError),
    /// The ticket belonged to an earlier generation and was dropped.
    Stale,
}

/// Accumulator and cursor for one result set.
///
/// At most one ticket is outstanding per generation. [`PageFeed::reset`]
/// starts a new generation; tickets from older generations complete as
/// [`FeedOutcome::Stale`] without touching state.
#[derive(Debug)]
pub struct PageFeed {
    params: SearchParams,
    items: Vec<NormalizedCatalogItem>,
    cursor: CursorState,
    phase: Phase,
    generation: u64,
    pages_loaded: usize,
}

impl PageFeed {
    #[must_use]
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            items: Vec::new(),
            cursor: CursorState::Start,
            phase: Phase::Idle,
            generation: 0,
            pages_loaded: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Accumulated items, in page order.
    #[must_use]
    pub fn items(&self) -> &[NormalizedCatalogItem] {
        &self.items
    }

    /// Accumulated items in display order (price sorts applied).
    #[must_use]
    pub fn display_items(&self) -> Vec<NormalizedCatalogItem> {
        let mut items = self.items.clone();
        self.params.sort.apply(&mut items);
        items
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.phase == Phase::Fetching
    }

    /// `false` once the upstream has stopped returning a cursor.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor != CursorState::Exhausted
    }

    /// Moves to `Fetching` and returns the request to issue, or `None` if a
    /// request is already in flight or there is nothing left to fetch.
    pub fn begin_fetch(&mut self) -> Option<PageTicket> {
        if self.phase == Phase::Fetching {
            return None;
        }
        let cursor = match &self.cursor {
            CursorState::Start => None,
            CursorState::Next(cursor) => Some(cursor.clone()),
            CursorState::Exhausted => return None,
        };
        self.phase = Phase::Fetching;
        Some(PageTicket {
            generation: self.generation,
            params: self.params.clone(),
            cursor,
        })
    }

    /// Applies a finished request and returns to `Idle`.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<CatalogPage, CatalogError>,
    ) -> FeedOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding page for superseded parameters"
            );
            return FeedOutcome::Stale;
        }
        self.phase = Phase::Idle;

        let page = match result {
            Ok(page) => page,
            Err(err) => return FeedOutcome::Failed(err),
        };

        let added = page.items.len();
        self.items.extend(page.items);
        self.pages_loaded += 1;
        self.cursor = match page.cursor {
            Some(next) if ticket.cursor.as_deref() == Some(next.as_str()) => {
                tracing::warn!(
                    cursor = %next,
                    "upstream returned the cursor it was given; treating results as exhausted"
                );
                CursorState::Exhausted
            }
            Some(next) => CursorState::Next(next),
            None => CursorState::Exhausted,
        };

        FeedOutcome::Appended {
            added,
            has_more: self.has_more(),
        }
    }

    /// Clears accumulated state for new parameters and starts a new
    /// generation. Returns the new generation number.
    pub fn reset(&mut self, params: SearchParams) -> u64 {
        self.generation += 1;
        self.params = params;
        self.items.clear();
        self.cursor = CursorState::Start;
        self.phase = Phase::Idle;
        self.pages_loaded = 0;
        self.generation
    }
}

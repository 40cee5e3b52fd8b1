//! Offset cursor with deduplication
//!
//! Pure state machine behind the listing worker. All mutation happens
//! through these methods, which the worker calls on message receipt.

use ahash::AHashSet;

use super::types::{ListingSnapshot, ListingState, PageRequest};
use crate::repository::{Entity, FilterSet};

/// Outcome of applying a fetched page
#[derive(Debug, Clone, PartialEq)]
pub enum PageApplied {
    /// The page belongs to a superseded generation and was ignored
    Stale,
    Appended {
        items: Vec<Entity>,
        has_more: bool,
        duplicates: usize,
    },
}

#[derive(Debug, Clone)]
pub struct ListingCursor {
    offset: usize,
    page_size: usize,
    has_more: bool,
    loaded_ids: AHashSet<String>,
    items: Vec<Entity>,
    state: ListingState,
    generation: u64,
    filters: FilterSet,
}

impl ListingCursor {
    #[must_use]
    pub fn new(page_size: usize, filters: FilterSet) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            has_more: true,
            loaded_ids: AHashSet::new(),
            items: Vec::new(),
            state: ListingState::Idle,
            generation: 0,
            filters,
        }
    }

    /// Authorize the next page if the cursor is idle and more pages exist.
    ///
    /// Returns `None` otherwise; the caller drops the request.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.state != ListingState::Idle || !self.has_more {
            return None;
        }
        self.state = ListingState::Loading;
        Some(self.page_request())
    }

    /// Discard everything and start over from offset 0 with `filters`.
    ///
    /// Valid in any state. Bumps the generation so an in-flight fetch for
    /// the old filters is ignored when it lands.
    pub fn reset(&mut self, filters: FilterSet) -> PageRequest {
        self.generation += 1;
        self.filters = filters;
        self.offset = 0;
        self.has_more = true;
        self.loaded_ids.clear();
        self.items.clear();
        self.state = ListingState::Loading;
        self.page_request()
    }

    /// Apply a fetched page for `generation`.
    ///
    /// `has_more` holds while pages come back full (an oversized page counts
    /// as full) and `offset` advances by the raw length, so duplicates still
    /// count toward the backend position.
    pub fn apply_page(&mut self, generation: u64, page: Vec<Entity>) -> PageApplied {
        if !self.is_current(generation) {
            return PageApplied::Stale;
        }

        let raw_len = page.len();
        let mut duplicates = 0;
        let mut fresh = Vec::with_capacity(raw_len);
        for entity in page {
            if self.loaded_ids.insert(entity.id().to_string()) {
                fresh.push(entity);
            } else {
                duplicates += 1;
            }
        }

        self.items.extend(fresh.iter().cloned());
        self.has_more = raw_len >= self.page_size;
        self.offset += raw_len;
        self.state = ListingState::Idle;

        PageApplied::Appended {
            items: fresh,
            has_more: self.has_more,
            duplicates,
        }
    }

    /// Record a failed fetch for `generation`. Loaded items are kept and no
    /// further pages are requested until the next reset.
    ///
    /// Returns `false` when the failure is stale and was ignored.
    pub fn apply_failure(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.has_more = false;
        self.state = ListingState::Idle;
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.state == ListingState::Loading
    }

    fn page_request(&self) -> PageRequest {
        PageRequest {
            generation: self.generation,
            offset: self.offset,
            limit: self.page_size,
            filters: self.filters.clone(),
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn state(&self) -> ListingState {
        self.state
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    #[must_use]
    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    #[must_use]
    pub fn snapshot(&self) -> ListingSnapshot {
        ListingSnapshot {
            items: self.items.clone(),
            offset: self.offset,
            page_size: self.page_size,
            has_more: self.has_more,
            state: self.state,
            generation: self.generation,
            filters: self.filters.clone(),
        }
    }
}

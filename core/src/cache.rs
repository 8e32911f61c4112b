use crate::query::ViewQuery;
use serde::{Deserialize, Serialize};

/// One cached page of rows plus pagination bookkeeping, as of the last
/// fetch or reconciliation.
///
/// Entries are values: the reconciler publishes a replacement rather than
/// editing a live entry, so a consumer holding a clone never observes a
/// half-applied change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<R> {
    /// At most `page_size` rows, in view order.
    pub rows: Vec<R>,
    /// Matching rows across all pages.
    pub total: u64,
    pub total_pages: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<R> CacheEntry<R> {
    /// Build an entry from a fetched page, deriving `total_pages`.
    pub fn new(query: &ViewQuery, rows: Vec<R>, total: u64) -> Self {
        Self { rows, total, total_pages: total_pages(total, query.page_size), page: query.page, page_size: query.page_size }
    }

    pub fn empty(query: &ViewQuery) -> Self { Self::new(query, Vec::new(), 0) }

    /// Replacement entry with new rows and total. `rows` and `total` only
    /// ever change together, and `total_pages` is recomputed with them.
    pub(crate) fn rebuild(&self, rows: Vec<R>, total: u64) -> Self {
        CacheEntry { rows, total, total_pages: total_pages(total, self.page_size), page: self.page, page_size: self.page_size }
    }
}

fn total_pages(total: u64, page_size: u32) -> u64 {
    if total == 0 {
        0
    } else {
        total.div_ceil(page_size.max(1) as u64)
    }
}

use crate::{cache::CacheEntry, query::ViewQuery, registry::ViewRegistry, row::Row};
use tracing::debug;
use viewsync_proto::{ChangeEvent, RemovePayload, RowId, UpsertPayload};

/// Applies incoming change events to every registered view of one
/// resource, in place, without a refetch. Pagination and filter
/// correctness are preserved per view; `rows` and `total` always move
/// together.
///
/// One subscriber's events are handled on one logical event loop, so a
/// single registry lock per event is all the synchronization needed.
pub struct Reconciler<R: Row> {
    registry: ViewRegistry<R>,
}

impl<R: Row> Reconciler<R> {
    pub fn new(registry: ViewRegistry<R>) -> Self { Self { registry } }

    pub fn registry(&self) -> &ViewRegistry<R> { &self.registry }

    /// Apply one event. A batched event reconciles all of its items
    /// before the single version bump, so observers see one atomic
    /// transition rather than N flickers.
    pub fn apply(&self, event: ChangeEvent<R>) {
        let changed = match event {
            ChangeEvent::Upsert(payload) => self.registry.reconcile_views(|query, entry| upsert_view(query, entry, &payload)),
            ChangeEvent::Remove(payload) => self.registry.reconcile_views(|_, entry| remove_view(entry, &payload.id)),
            ChangeEvent::BatchUpsert(batch) => {
                let mut changed = false;
                for item in &batch.items {
                    changed |= self.registry.reconcile_views(|query, entry| upsert_view(query, entry, item));
                }
                changed
            }
            ChangeEvent::BatchRemove(batch) => {
                let mut changed = false;
                for item in &batch.items {
                    changed |= self.registry.reconcile_views(|_, entry| remove_view(entry, &item.id));
                }
                changed
            }
        };
        if changed {
            self.registry.mark_dirty();
            debug!(version = self.registry.version(), "reconciled change event");
        }
    }

    pub fn on_upsert(&self, payload: UpsertPayload<R>) { self.apply(ChangeEvent::Upsert(payload)); }

    pub fn on_remove(&self, payload: RemovePayload) { self.apply(ChangeEvent::Remove(payload)); }
}

/// One view's reaction to an upserted row. Returns the replacement entry
/// when the view changed, `None` when the event is irrelevant to it.
fn upsert_view<R: Row>(query: &ViewQuery, entry: &CacheEntry<R>, payload: &UpsertPayload<R>) -> Option<CacheEntry<R>> {
    let row = &payload.row;
    let matches = query.matches(row, payload.new_status);
    let existing = entry.rows.iter().position(|cached| cached.id() == row.id());

    match (existing, matches) {
        // Irrelevant to this view.
        (None, false) => None,

        // Full replacement, never a field merge: the server snapshot
        // supersedes any optimistic local edit. A snapshot demonstrably
        // older than the cached copy is the one exception.
        (Some(index), true) => {
            if stale(&entry.rows[index], row) || entry.rows[index] == *row {
                return None;
            }
            let mut rows = entry.rows.clone();
            rows[index] = row.clone();
            Some(entry.rebuild(rows, entry.total))
        }

        (None, true) => {
            // Past page 1 there is no safe insertion point; the view
            // stays transiently short one row until its owner refetches,
            // and total is left alone so rows/total agree.
            if query.page != 1 {
                return None;
            }
            let mut rows = Vec::with_capacity(entry.rows.len() + 1);
            rows.push(row.clone());
            rows.extend(entry.rows.iter().cloned());
            rows.truncate(query.page_size as usize);
            Some(entry.rebuild(rows, entry.total + 1))
        }

        // The row left this view's partition or stopped matching its
        // search/filters.
        (Some(index), false) => {
            let mut rows = entry.rows.clone();
            rows.remove(index);
            Some(entry.rebuild(rows, entry.total.saturating_sub(1)))
        }
    }
}

/// A removed row disappears from every view that holds it, whatever that
/// view's partition.
fn remove_view<R: Row>(entry: &CacheEntry<R>, id: &RowId) -> Option<CacheEntry<R>> {
    let index = entry.rows.iter().position(|cached| cached.id() == id)?;
    let mut rows = entry.rows.clone();
    rows.remove(index);
    Some(entry.rebuild(rows, entry.total.saturating_sub(1)))
}

/// Per-row last-write-wins: with both timestamps present, an incoming
/// snapshot strictly older than the cached one is discarded.
fn stale<R: Row>(cached: &R, incoming: &R) -> bool {
    match (cached.updated_at(), incoming.updated_at()) {
        (Some(have), Some(got)) => got < have,
        _ => false,
    }
}

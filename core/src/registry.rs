use crate::{cache::CacheEntry, query::ViewQuery, row::Row};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, Weak},
};
use tokio::sync::watch;
use tracing::debug;

/// Tracks every open list view for one resource and the page cache behind
/// each. One instance per resource per subscriber session, exclusively
/// owned by that session's reconciler; cheap to clone.
pub struct ViewRegistry<R: Row>(Arc<Inner<R>>);

impl<R: Row> Clone for ViewRegistry<R> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

struct Inner<R: Row> {
    state: Mutex<State<R>>,
    version_tx: watch::Sender<u64>,
}

struct State<R: Row> {
    views: HashMap<ViewQuery, Slot<R>>,
    version: u64,
}

struct Slot<R> {
    /// Open handles sharing this normalized query.
    handles: usize,
    entry: Option<CacheEntry<R>>,
}

impl<R: Row> Default for ViewRegistry<R> {
    fn default() -> Self { Self::new() }
}

impl<R: Row> ViewRegistry<R> {
    pub fn new() -> Self {
        let (version_tx, _) = watch::channel(0);
        Self(Arc::new(Inner { state: Mutex::new(State { views: HashMap::new(), version: 0 }), version_tx }))
    }

    /// Register an open view. Semantically-identical queries share one
    /// cache slot; the slot (and its entry) lives until the last handle
    /// is dropped.
    pub fn register(&self, query: ViewQuery) -> ViewHandle<R> {
        let query = query.normalize();
        let mut state = self.0.state.lock().unwrap();
        let slot = state.views.entry(query.clone()).or_insert(Slot { handles: 0, entry: None });
        slot.handles += 1;
        debug!(open_views = state.views.len(), "registered view");
        ViewHandle { registry: Arc::downgrade(&self.0), query }
    }

    /// Cached page for a query, if the view is open and has been seeded.
    pub fn get(&self, query: &ViewQuery) -> Option<CacheEntry<R>> {
        self.0.state.lock().unwrap().views.get(query).and_then(|slot| slot.entry.clone())
    }

    /// Store a fetched or reconciled page. A query nobody has registered
    /// (or that was torn down while this update was in flight) is
    /// silently discarded.
    pub fn set(&self, query: &ViewQuery, entry: CacheEntry<R>) {
        let mut state = self.0.state.lock().unwrap();
        if let Some(slot) = state.views.get_mut(query) {
            slot.entry = Some(entry);
        }
    }

    /// Current cache version. Bumped once per applied event; a batched
    /// event is one bump.
    pub fn version(&self) -> u64 { *self.0.version_tx.borrow() }

    /// Version signal for consumers that re-read the cache on change.
    /// `watch` coalesces intermediate bumps, so a burst of events costs a
    /// consumer one re-read.
    pub fn watch(&self) -> watch::Receiver<u64> { self.0.version_tx.subscribe() }

    pub fn len(&self) -> usize { self.0.state.lock().unwrap().views.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Run one reconciliation step over every seeded view under a single
    /// lock. `step` returns a replacement entry where the view changed.
    /// Returns whether anything changed.
    pub(crate) fn reconcile_views<F>(&self, mut step: F) -> bool
    where F: FnMut(&ViewQuery, &CacheEntry<R>) -> Option<CacheEntry<R>> {
        let mut state = self.0.state.lock().unwrap();
        let mut changed = false;
        for (query, slot) in state.views.iter_mut() {
            if let Some(entry) = &slot.entry {
                if let Some(next) = step(query, entry) {
                    slot.entry = Some(next);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Bump the cache version and wake watchers.
    pub(crate) fn mark_dirty(&self) {
        let version = {
            let mut state = self.0.state.lock().unwrap();
            state.version += 1;
            state.version
        };
        let _ = self.0.version_tx.send(version);
    }
}

/// Handle to one open view. Dropping it closes the view; the underlying
/// slot is destroyed with the last handle, and any reconciliation racing
/// the teardown is discarded by the registry.
pub struct ViewHandle<R: Row> {
    registry: Weak<Inner<R>>,
    query: ViewQuery,
}

impl<R: Row> ViewHandle<R> {
    /// The normalized query this view is keyed by.
    pub fn query(&self) -> &ViewQuery { &self.query }

    pub fn entry(&self) -> Option<CacheEntry<R>> {
        let inner = self.registry.upgrade()?;
        let state = inner.state.lock().unwrap();
        state.views.get(&self.query).and_then(|slot| slot.entry.clone())
    }

    /// Seed the cache with the initially-fetched page. The engine never
    /// issues that fetch itself; it belongs to the resource's list-query
    /// layer.
    pub fn seed(&self, entry: CacheEntry<R>) {
        if let Some(inner) = self.registry.upgrade() {
            let mut state = inner.state.lock().unwrap();
            if let Some(slot) = state.views.get_mut(&self.query) {
                slot.entry = Some(entry);
            }
        }
    }
}

impl<R: Row> Drop for ViewHandle<R> {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            let mut state = inner.state.lock().unwrap();
            if let Some(slot) = state.views.get_mut(&self.query) {
                slot.handles -= 1;
                if slot.handles == 0 {
                    state.views.remove(&self.query);
                    debug!(open_views = state.views.len(), "closed last handle for view");
                }
            }
        }
    }
}

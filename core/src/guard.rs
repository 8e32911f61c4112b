use std::{
    collections::HashSet,
    sync::{Arc, Mutex, Weak},
};
use thiserror::Error;
use tracing::debug;
use viewsync_proto::RowId;

/// The three destructive actions the guard arbitrates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    Delete,
    Restore,
    HardDelete,
}

/// A bulk destructive action was rejected because some of its rows were
/// already busy. Nothing was locked; the action must not be issued.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("rows already busy: {conflicting:?}")]
pub struct GuardConflict {
    /// Sorted, deduplicated ids that caused the rejection.
    pub conflicting: Vec<RowId>,
}

/// Per-row busy set preventing two destructive actions from racing on the
/// same entity. One instance per resource, shared by every UI surface of
/// the subscriber session; cheap to clone.
///
/// A row id sits in at most one of the three sets at a time: a row being
/// deleted can be neither restored nor hard-deleted until released.
#[derive(Clone, Default)]
pub struct MutationGuard(Arc<Mutex<Sets>>);

#[derive(Default)]
struct Sets {
    deleting: HashSet<RowId>,
    restoring: HashSet<RowId>,
    hard_deleting: HashSet<RowId>,
}

impl Sets {
    fn of(&mut self, kind: GuardKind) -> &mut HashSet<RowId> {
        match kind {
            GuardKind::Delete => &mut self.deleting,
            GuardKind::Restore => &mut self.restoring,
            GuardKind::HardDelete => &mut self.hard_deleting,
        }
    }

    fn busy(&self, id: &RowId) -> bool {
        self.deleting.contains(id) || self.restoring.contains(id) || self.hard_deleting.contains(id)
    }
}

impl MutationGuard {
    pub fn new() -> Self { Self::default() }

    /// Try to mark one row busy for `kind`. `None` means another
    /// destructive action already owns the row; the caller surfaces a
    /// no-op and must not issue the request.
    pub fn try_acquire(&self, id: &RowId, kind: GuardKind) -> Option<GuardPermit> {
        let mut sets = self.0.lock().unwrap();
        if sets.busy(id) {
            debug!(%id, ?kind, "guard denied, row already busy");
            return None;
        }
        sets.of(kind).insert(id.clone());
        Some(GuardPermit { sets: Arc::downgrade(&self.0), ids: vec![id.clone()], kind })
    }

    /// All-or-nothing acquisition for a bulk action: if any id is already
    /// busy the whole batch is rejected with the conflicting ids and no
    /// lock is taken.
    pub fn try_acquire_batch(&self, ids: &[RowId], kind: GuardKind) -> Result<GuardPermit, GuardConflict> {
        let mut sets = self.0.lock().unwrap();
        let mut conflicting: Vec<RowId> = ids.iter().filter(|id| sets.busy(id)).cloned().collect();
        if !conflicting.is_empty() {
            conflicting.sort();
            conflicting.dedup();
            debug!(?kind, conflicts = conflicting.len(), "guard rejected bulk action");
            return Err(GuardConflict { conflicting });
        }
        let set = sets.of(kind);
        for id in ids {
            set.insert(id.clone());
        }
        Ok(GuardPermit { sets: Arc::downgrade(&self.0), ids: ids.to_vec(), kind })
    }

    /// Unconditional, idempotent release. [`GuardPermit`] calls this on
    /// drop; releasing a row that is not held is a no-op.
    pub fn release(&self, id: &RowId, kind: GuardKind) {
        self.0.lock().unwrap().of(kind).remove(id);
    }

    /// Whether any destructive action currently owns the row.
    pub fn is_busy(&self, id: &RowId) -> bool { self.0.lock().unwrap().busy(id) }
}

/// Releases its rows when dropped, however the guarded request ended.
/// A crashed request cannot leave a row locked forever.
#[must_use = "dropping the permit releases the rows immediately"]
#[derive(Debug)]
pub struct GuardPermit {
    sets: Weak<Mutex<Sets>>,
    ids: Vec<RowId>,
    kind: GuardKind,
}

impl GuardPermit {
    pub fn ids(&self) -> &[RowId] { &self.ids }

    pub fn kind(&self) -> GuardKind { self.kind }
}

impl Drop for GuardPermit {
    fn drop(&mut self) {
        if let Some(sets) = self.sets.upgrade() {
            let mut sets = sets.lock().unwrap();
            let set = sets.of(self.kind);
            for id in &self.ids {
                set.remove(id);
            }
        }
    }
}

use crate::{error::NotifyError, row::Row, snapshot::SnapshotBuilder, transport::GroupSender};
use std::sync::Arc;
use tracing::debug;
use viewsync_proto::{BatchPayload, ChangeEvent, EventId, GroupId, RemovePayload, ResourceName, RowId, Status, UpsertPayload};

/// What the completed mutation was. Carried in log output only; the
/// emitted event is derived from the fresh snapshot, not from the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Restore,
    HardDelete,
}

/// Turns a completed mutation into typed change events multicast to the
/// resource's subscriber group.
///
/// Runs on the server, concurrently with ordinary request handling; each
/// emission is independent and idempotent-by-replacement on the receiving
/// side. Performs no storage writes; those already happened in the
/// mutation that triggered it.
pub struct ChangeNotifier<R: Row> {
    resource: ResourceName,
    group: GroupId,
    snapshots: Arc<dyn SnapshotBuilder<R>>,
    sender: Box<dyn GroupSender>,
}

impl<R: Row> ChangeNotifier<R> {
    pub fn new(resource: ResourceName, group: GroupId, snapshots: Arc<dyn SnapshotBuilder<R>>, sender: Box<dyn GroupSender>) -> Self {
        Self { resource, group, snapshots, sender }
    }

    pub fn resource(&self) -> &ResourceName { &self.resource }

    pub fn group(&self) -> &GroupId { &self.group }

    /// Notify subscribers about one mutated row. `previous` is the status
    /// partition the row sat in before the mutation, `None` for a
    /// creation.
    pub async fn notify(&self, kind: MutationKind, id: &RowId, previous: Option<Status>) -> Result<(), NotifyError> {
        match self.change_for(id, previous).await? {
            Some(RowChange::Upsert(payload)) => self.emit(ChangeEvent::Upsert(payload)).await,
            Some(RowChange::Remove(payload)) => self.emit(ChangeEvent::Remove(payload)).await,
            None => {
                debug!(%id, ?kind, "row was never visible, nothing to emit");
                Ok(())
            }
        }
    }

    /// Batch variant: one wire message per event form instead of one per
    /// row. An optimization only; subscribers apply batched items
    /// exactly as they would the singleton events.
    pub async fn notify_batch(&self, kind: MutationKind, ids: &[RowId], previous: Option<Status>) -> Result<(), NotifyError> {
        let mut upserts = Vec::new();
        let mut removes = Vec::new();
        for id in ids {
            match self.change_for(id, previous).await? {
                Some(RowChange::Upsert(payload)) => upserts.push(payload),
                Some(RowChange::Remove(payload)) => removes.push(payload),
                None => debug!(%id, ?kind, "row was never visible, skipped in batch"),
            }
        }
        if !upserts.is_empty() {
            self.emit(ChangeEvent::BatchUpsert(BatchPayload { items: upserts })).await?;
        }
        if !removes.is_empty() {
            self.emit(ChangeEvent::BatchRemove(BatchPayload { items: removes })).await?;
        }
        Ok(())
    }

    /// Fresh snapshot decides the event: a row that still exists is an
    /// upsert into its current partition; a vanished row that used to be
    /// visible is a remove; a vanished row nobody ever saw is nothing.
    async fn change_for(&self, id: &RowId, previous: Option<Status>) -> Result<Option<RowChange<R>>, NotifyError> {
        match self.snapshots.snapshot(id).await? {
            Some(row) => {
                let new_status = row.status();
                Ok(Some(RowChange::Upsert(UpsertPayload { row, previous_status: previous, new_status })))
            }
            None => Ok(previous.map(|previous_status| RowChange::Remove(RemovePayload { id: id.clone(), previous_status }))),
        }
    }

    async fn emit(&self, event: ChangeEvent<R>) -> Result<(), NotifyError> {
        let event_id = EventId::new();
        let name = event.wire_name(&self.resource);
        let payload = event.encode()?;
        debug!(%event_id, %name, group = %self.group, "emitting change event");
        self.sender.emit(&self.group, &name, payload).await?;
        Ok(())
    }
}

enum RowChange<R> {
    Upsert(UpsertPayload<R>),
    Remove(RemovePayload),
}

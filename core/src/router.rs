use crate::{reconciler::Reconciler, row::Row};
use tracing::warn;
use viewsync_proto::{ChangeEvent, EventKind, ResourceName};

/// Client-edge dispatch for one resource: parses named wire events and
/// feeds them to the reconciler.
///
/// Events named for other resources are not ours and pass silently; an
/// event that claims our resource but cannot be understood costs a
/// diagnostic log line and nothing else. Nothing here ever panics into
/// the connection's event loop.
pub struct EventRouter<R: Row> {
    resource: ResourceName,
    reconciler: Reconciler<R>,
}

impl<R: Row> EventRouter<R> {
    pub fn new(resource: ResourceName, reconciler: Reconciler<R>) -> Self { Self { resource, reconciler } }

    pub fn resource(&self) -> &ResourceName { &self.resource }

    pub fn reconciler(&self) -> &Reconciler<R> { &self.reconciler }

    /// Handle one incoming transport event.
    pub fn handle(&self, event_name: &str, payload: serde_json::Value) {
        let Some(suffix) = event_name.strip_prefix(self.resource.as_str()).and_then(|rest| rest.strip_prefix(':')) else {
            return;
        };
        let Some(kind) = EventKind::from_suffix(suffix) else {
            warn!(%event_name, "discarding event with unknown suffix");
            return;
        };
        match ChangeEvent::<R>::decode(kind, payload) {
            Ok(event) => self.reconciler.apply(event),
            Err(error) => warn!(%event_name, %error, "discarding malformed change event"),
        }
    }
}

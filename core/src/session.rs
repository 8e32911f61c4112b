use crate::{
    guard::MutationGuard,
    query::ViewQuery,
    reconciler::Reconciler,
    registry::{ViewHandle, ViewRegistry},
    router::EventRouter,
    row::Row,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use viewsync_proto::ResourceName;

/// Client-side assembly for one resource: view registry, reconciler,
/// event router and mutation guard, constructed together and torn down
/// with the subscriber session. No process-wide state; two sessions over
/// the same resource are fully independent.
///
/// The session never issues the initial page fetch; callers seed each
/// opened view from their own list-query layer, after which arriving
/// events keep it current.
pub struct ResourceSession<R: Row> {
    resource: ResourceName,
    registry: ViewRegistry<R>,
    router: Arc<EventRouter<R>>,
    guard: MutationGuard,
}

impl<R: Row> ResourceSession<R> {
    pub fn new(resource: ResourceName) -> Self {
        let registry = ViewRegistry::new();
        let router = Arc::new(EventRouter::new(resource.clone(), Reconciler::new(registry.clone())));
        debug!(%resource, "resource session created");
        Self { resource, registry, router, guard: MutationGuard::new() }
    }

    pub fn resource(&self) -> &ResourceName { &self.resource }

    pub fn registry(&self) -> &ViewRegistry<R> { &self.registry }

    /// The transport hands every event within the connection scope to
    /// this router; it keeps what is ours.
    pub fn router(&self) -> Arc<EventRouter<R>> { self.router.clone() }

    /// The per-row busy set shared by every surface of this session.
    pub fn guard(&self) -> MutationGuard { self.guard.clone() }

    /// Open a list view. Shortcut for `registry().register`.
    pub fn open_view(&self, query: ViewQuery) -> ViewHandle<R> { self.registry.register(query) }

    /// Cache-version signal; see [`ViewRegistry::watch`].
    pub fn watch(&self) -> watch::Receiver<u64> { self.registry.watch() }
}

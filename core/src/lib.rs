pub mod cache;
pub mod error;
pub mod guard;
pub mod notifier;
pub mod query;
pub mod reconciler;
pub mod registry;
pub mod router;
pub mod row;
pub mod session;
pub mod snapshot;
pub mod transport;

pub use cache::CacheEntry;
pub use error::NotifyError;
pub use guard::{GuardConflict, GuardKind, GuardPermit, MutationGuard};
pub use notifier::{ChangeNotifier, MutationKind};
pub use query::{FilterValue, StatusFilter, ViewQuery};
pub use reconciler::Reconciler;
pub use registry::{ViewHandle, ViewRegistry};
pub use router::EventRouter;
pub use row::Row;
pub use session::ResourceSession;
pub use snapshot::{SnapshotBuilder, SnapshotError};
pub use transport::{GroupSender, SendError};

pub use viewsync_proto as proto;

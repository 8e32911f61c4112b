use crate::{snapshot::SnapshotError, transport::SendError};
use thiserror::Error;
use viewsync_proto::DecodeError;

/// Error raised while turning a completed mutation into emitted events.
///
/// Returned from: `ChangeNotifier::notify`, `ChangeNotifier::notify_batch`.
/// The engine performs no retries; the initiating mutation decides what a
/// failed emission is worth.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Snapshot build failed in the resource's data-access layer.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Payload could not be encoded for the wire.
    #[error("encode error: {0}")]
    Encode(#[from] DecodeError),

    /// Transport refused the emission.
    #[error("send error: {0}")]
    Send(#[from] SendError),
}

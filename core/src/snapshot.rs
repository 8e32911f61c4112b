use crate::row::Row;
use async_trait::async_trait;
use thiserror::Error;
use viewsync_proto::RowId;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Builds the canonical, fully-denormalized representation of one row,
/// exactly as a list view would render it. Pure over current storage
/// state; results are produced on demand and never cached server-side.
#[async_trait]
pub trait SnapshotBuilder<R: Row>: Send + Sync {
    /// `Ok(None)` when the row no longer exists (hard-deleted between the
    /// mutation and this lookup).
    async fn snapshot(&self, id: &RowId) -> Result<Option<R>, SnapshotError>;
}

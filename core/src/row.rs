use crate::query::FilterValue;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use viewsync_proto::{RowId, Status};

/// A fully-denormalized list row for one resource, exactly as a list view
/// renders it.
///
/// Implementations declare their searchable string fields and filterable
/// scalar fields by name; the engine stays generic over both and never
/// looks inside a row except through this trait.
pub trait Row: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable row identifier.
    fn id(&self) -> &RowId;

    /// Soft-delete marker. `None` keeps the row in the active partition.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Last server-side modification time. Used only to compare the
    /// freshness of two snapshots of the same row.
    fn updated_at(&self) -> Option<DateTime<Utc>> { None }

    /// Names of the searchable string fields, in declaration order.
    fn search_fields() -> &'static [&'static str] { &[] }

    /// Value of one searchable field.
    fn search_text(&self, _field: &str) -> Option<&str> { None }

    /// Value of one filterable field.
    fn filter_value(&self, _field: &str) -> Option<FilterValue> { None }

    /// Status partition derived from the soft-delete marker.
    fn status(&self) -> Status {
        if self.deleted_at().is_some() {
            Status::Deleted
        } else {
            Status::Active
        }
    }
}

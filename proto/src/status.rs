use serde::{Deserialize, Serialize};

/// Status partition of a row, derived from its soft-delete marker:
/// active while `deleted_at` is unset, deleted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Deleted,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Deleted => write!(f, "deleted"),
        }
    }
}

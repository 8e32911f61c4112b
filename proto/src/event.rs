use crate::{error::DecodeError, id::ResourceName, id::RowId, status::Status};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// The four wire events a resource can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Upsert,
    Remove,
    BatchUpsert,
    BatchRemove,
}

impl EventKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            EventKind::Upsert => "upsert",
            EventKind::Remove => "remove",
            EventKind::BatchUpsert => "batch-upsert",
            EventKind::BatchRemove => "batch-remove",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "upsert" => Some(EventKind::Upsert),
            "remove" => Some(EventKind::Remove),
            "batch-upsert" => Some(EventKind::BatchUpsert),
            "batch-remove" => Some(EventKind::BatchRemove),
            _ => None,
        }
    }

    /// Wire name of this event for one resource, e.g. `posts:batch-upsert`.
    pub fn wire_name(&self, resource: &ResourceName) -> String { format!("{}:{}", resource, self.suffix()) }

    /// Inverse of [`EventKind::wire_name`]. `None` when the name belongs
    /// to another resource or carries an unknown suffix.
    pub fn parse(resource: &ResourceName, event_name: &str) -> Option<Self> {
        let suffix = event_name.strip_prefix(resource.as_str())?.strip_prefix(':')?;
        Self::from_suffix(suffix)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.suffix()) }
}

/// A row that is still visible in at least one partition, as a full
/// snapshot. `previous_status` is `None` for a newly created row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPayload<R> {
    pub row: R,
    pub previous_status: Option<Status>,
    pub new_status: Status,
}

/// A row that no longer exists for the subscriber class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePayload {
    pub id: RowId,
    pub previous_status: Status,
}

/// Ordered batch wrapper. One wire message for a bulk mutation instead of
/// one per row; receivers apply items exactly as singleton events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload<T> {
    pub items: Vec<T>,
}

/// A change to one resource, as multicast to its subscriber group.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<R> {
    Upsert(UpsertPayload<R>),
    Remove(RemovePayload),
    BatchUpsert(BatchPayload<UpsertPayload<R>>),
    BatchRemove(BatchPayload<RemovePayload>),
}

impl<R> ChangeEvent<R> {
    pub fn kind(&self) -> EventKind {
        match self {
            ChangeEvent::Upsert(_) => EventKind::Upsert,
            ChangeEvent::Remove(_) => EventKind::Remove,
            ChangeEvent::BatchUpsert(_) => EventKind::BatchUpsert,
            ChangeEvent::BatchRemove(_) => EventKind::BatchRemove,
        }
    }

    pub fn wire_name(&self, resource: &ResourceName) -> String { self.kind().wire_name(resource) }
}

impl<R: Serialize + DeserializeOwned> ChangeEvent<R> {
    pub fn encode(&self) -> Result<serde_json::Value, DecodeError> {
        Ok(match self {
            ChangeEvent::Upsert(payload) => serde_json::to_value(payload)?,
            ChangeEvent::Remove(payload) => serde_json::to_value(payload)?,
            ChangeEvent::BatchUpsert(payload) => serde_json::to_value(payload)?,
            ChangeEvent::BatchRemove(payload) => serde_json::to_value(payload)?,
        })
    }

    pub fn decode(kind: EventKind, payload: serde_json::Value) -> Result<Self, DecodeError> {
        Ok(match kind {
            EventKind::Upsert => ChangeEvent::Upsert(serde_json::from_value(payload)?),
            EventKind::Remove => ChangeEvent::Remove(serde_json::from_value(payload)?),
            EventKind::BatchUpsert => ChangeEvent::BatchUpsert(serde_json::from_value(payload)?),
            EventKind::BatchRemove => ChangeEvent::BatchRemove(serde_json::from_value(payload)?),
        })
    }
}

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Stable identifier of a row within one resource. Opaque to the engine;
/// whatever the resource's storage layer uses as a primary key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for RowId {
    fn from(val: &str) -> Self { RowId(val.to_string()) }
}

impl From<String> for RowId {
    fn from(val: String) -> Self { RowId(val) }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Lowercase resource key (e.g. `posts`). Prefixes every wire event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for ResourceName {
    fn from(val: &str) -> Self { ResourceName(val.to_string()) }
}

impl std::fmt::Display for ResourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Named multicast group. Convention: one group per authorized-role class
/// per resource, so the emitter never addresses individual subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    /// Group for one role class over one resource, e.g. `editor:posts`.
    pub fn scoped(role: &str, resource: &ResourceName) -> Self { GroupId(format!("{role}:{resource}")) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for GroupId {
    fn from(val: &str) -> Self { GroupId(val.to_string()) }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Identifies one emission, for log correlation across server and
/// subscribers. Carries no ordering meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct EventId(Ulid);

impl EventId {
    pub fn new() -> Self { Self(Ulid::new()) }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "E-{}", self.0) }
}

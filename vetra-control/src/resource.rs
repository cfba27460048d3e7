use serde::{Deserialize, Serialize};
use std::fmt;

/// The resource kinds managed by the Vetra control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    KafkaInstance,
    SchemaRegistry,
    ServiceAccount,
    Topic,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::KafkaInstance => "kafka instance",
            ResourceKind::SchemaRegistry => "schema registry",
            ResourceKind::ServiceAccount => "service account",
            ResourceKind::Topic => "topic",
        };
        write!(f, "{}", name)
    }
}

/// Identifies one managed resource instance.
///
/// The `id` is assigned by the remote system and is opaque to the harness.
/// The `name` is user-chosen and NOT guaranteed unique by the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ResourceKind) -> Self {
        ResourceHandle {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' ({})", self.kind, self.name, self.id)
    }
}

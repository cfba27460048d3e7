use crate::resource::ResourceHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of an observed status, shared across resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Provisioning finished, the resource is usable.
    Ready,
    /// Still converging; poll again.
    NotReady,
    /// The remote system gave up on this resource.
    Failed,
}

/// Implemented by every kind-specific status so the readiness wait can
/// classify observations without knowing the resource kind.
pub trait ObservedStatus {
    fn readiness(&self) -> Readiness;

    /// Short human-readable form used in logs and timeout reports.
    fn label(&self) -> &'static str;
}

/// Lifecycle status of a streaming (Kafka) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KafkaInstanceStatus {
    Accepted,
    Provisioning,
    Ready,
    Deprovisioning,
    Failed,
}

impl ObservedStatus for KafkaInstanceStatus {
    fn readiness(&self) -> Readiness {
        match self {
            KafkaInstanceStatus::Ready => Readiness::Ready,
            KafkaInstanceStatus::Failed => Readiness::Failed,
            _ => Readiness::NotReady,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            KafkaInstanceStatus::Accepted => "accepted",
            KafkaInstanceStatus::Provisioning => "provisioning",
            KafkaInstanceStatus::Ready => "ready",
            KafkaInstanceStatus::Deprovisioning => "deprovisioning",
            KafkaInstanceStatus::Failed => "failed",
        }
    }
}

/// Lifecycle status of a schema registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryStatus {
    Provisioning,
    Ready,
    Failed,
}

impl ObservedStatus for RegistryStatus {
    fn readiness(&self) -> Readiness {
        match self {
            RegistryStatus::Ready => Readiness::Ready,
            RegistryStatus::Failed => Readiness::Failed,
            RegistryStatus::Provisioning => Readiness::NotReady,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RegistryStatus::Provisioning => "provisioning",
            RegistryStatus::Ready => "ready",
            RegistryStatus::Failed => "failed",
        }
    }
}

/// Status for existence-only kinds (service accounts, topics): a
/// successful fetch already means the resource is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Present,
}

impl ObservedStatus for Presence {
    fn readiness(&self) -> Readiness {
        Readiness::Ready
    }

    fn label(&self) -> &'static str {
        "present"
    }
}

/// One status fetch as returned by the control plane: the handle of the
/// fetched resource, the classified status and the raw payload kept for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct Observation<S> {
    pub handle: ResourceHandle,
    pub status: S,
    pub raw: Value,
}

impl<S> Observation<S> {
    pub fn new(handle: ResourceHandle, status: S, raw: Value) -> Self {
        Observation {
            handle,
            status,
            raw,
        }
    }
}

//! Vetra-Control
//!
//! Control plane data model and collaborator traits for the Vetra managed
//! streaming platform: resource handles, kind-specific statuses, create
//! payloads, the error taxonomy and the `ResourceApi`/`MessageGateway`
//! seams consumed by the e2e harness.

mod errors;
pub use errors::{ControlPlaneError, Result};

mod resource;
pub use resource::{ResourceHandle, ResourceKind};

mod status;
pub use status::{
    KafkaInstanceStatus, Observation, ObservedStatus, Presence, Readiness, RegistryStatus,
};

mod api;
pub use api::{
    CreateKafkaRequest, CreateRegistryRequest, CreateServiceAccountRequest, CreateTopicRequest,
    MessageGateway, NamedPayload, ResourceApi,
};

pub mod providers;
pub use providers::in_memory::{InMemoryControlPlane, ProvisioningProfile};

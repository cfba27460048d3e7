use crate::errors::Result;
use crate::resource::{ResourceHandle, ResourceKind};
use crate::status::{Observation, ObservedStatus};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Implemented by every create payload so generic orchestration code can
/// look up existing resources by the requested name.
pub trait NamedPayload {
    fn name(&self) -> &str;
}

/// Request body for creating a streaming (Kafka) instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateKafkaRequest {
    pub name: String,
    pub cloud_provider: String,
    pub region: String,
    pub multi_az: bool,
}

impl CreateKafkaRequest {
    /// Default instance shape used by the e2e suites.
    pub fn standard(name: impl Into<String>) -> Self {
        CreateKafkaRequest {
            name: name.into(),
            cloud_provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            multi_az: true,
        }
    }
}

impl NamedPayload for CreateKafkaRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistryRequest {
    pub name: String,
}

impl NamedPayload for CreateRegistryRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceAccountRequest {
    pub name: String,
}

impl NamedPayload for CreateServiceAccountRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTopicRequest {
    /// The streaming instance this topic lives on.
    pub instance_id: String,
    pub name: String,
    pub partitions: u32,
}

impl NamedPayload for CreateTopicRequest {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One resource kind of the control plane, as consumed by the harness.
///
/// Implementations are external collaborators (generated REST clients in
/// production, [`crate::providers::in_memory`] in tests). Every method maps
/// to a single remote call; classification of failures happens through
/// [`crate::ControlPlaneError::is_not_found`] / `is_conflict` on the error.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    type Payload: NamedPayload + Send + Sync;
    type Status: ObservedStatus + Send + Sync;

    fn kind(&self) -> ResourceKind;

    /// Ask the remote system to create the resource. Fails with a
    /// conflict-classified error when the name is already taken.
    async fn create(&self, payload: &Self::Payload) -> Result<ResourceHandle>;

    /// Fetch the current status of the resource by id.
    async fn fetch_status(&self, id: &str) -> Result<Observation<Self::Status>>;

    /// List handles matching the given name. Possibly empty; possibly
    /// more than one, since the remote system does not enforce name
    /// uniqueness.
    async fn list_by_name(&self, name: &str) -> Result<Vec<ResourceHandle>>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// Produce/consume access to a streaming instance.
///
/// The real broker client is out of scope for the harness; scenario "use"
/// steps go through this seam so the same steps run against the in-memory
/// provider.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn produce(&self, instance_id: &str, topic: &str, payload: &str) -> Result<()>;

    async fn consume_one(&self, instance_id: &str, topic: &str) -> Result<String>;
}

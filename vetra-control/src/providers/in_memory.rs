use crate::{
    api::{
        CreateKafkaRequest, CreateRegistryRequest, CreateServiceAccountRequest,
        CreateTopicRequest, MessageGateway, ResourceApi,
    },
    errors::Result,
    resource::{ResourceHandle, ResourceKind},
    status::{KafkaInstanceStatus, Observation, Presence, RegistryStatus},
    ControlPlaneError,
};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// How many status fetches a simulated resource needs before it converges.
///
/// `fetches_until_ready` counts the not-ready observations returned before
/// a resource reports ready; `fetches_until_gone` counts the deprovisioning
/// observations returned after a delete before fetches start returning
/// not-found. Both default to zero (immediate convergence).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisioningProfile {
    pub fetches_until_ready: u32,
    pub fetches_until_gone: u32,
}

#[derive(Debug)]
struct Record {
    handle: ResourceHandle,
    fetches: u32,
    deleting: bool,
    delete_fetches: u32,
    failed: bool,
}

impl Record {
    fn new(handle: ResourceHandle) -> Self {
        Record {
            handle,
            fetches: 0,
            deleting: false,
            delete_fetches: 0,
            failed: false,
        }
    }
}

/// Where a simulated resource currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimPhase {
    Provisioning,
    Ready,
    Deprovisioning,
    Failed,
}

#[derive(Debug, Default)]
struct Inner {
    profile: std::sync::Mutex<ProvisioningProfile>,
    instances: DashMap<String, Record>,
    registries: DashMap<String, Record>,
    accounts: DashMap<String, Record>,
    topics: DashMap<String, Record>,
    // (instance_id, topic) -> pending messages
    messages: DashMap<(String, String), Vec<String>>,
    creates_issued: DashMap<ResourceKind, u64>,
    deletes_issued: DashMap<ResourceKind, u64>,
    fail_creates: DashMap<ResourceKind, String>,
    fail_fetches: DashMap<ResourceKind, String>,
    next_id: AtomicU64,
}

impl Inner {
    fn profile(&self) -> ProvisioningProfile {
        *self.profile.lock().unwrap()
    }

    fn records(&self, kind: ResourceKind) -> &DashMap<String, Record> {
        match kind {
            ResourceKind::KafkaInstance => &self.instances,
            ResourceKind::SchemaRegistry => &self.registries,
            ResourceKind::ServiceAccount => &self.accounts,
            ResourceKind::Topic => &self.topics,
        }
    }

    fn mint_id(&self, kind: ResourceKind) -> String {
        let prefix = match kind {
            ResourceKind::KafkaInstance => "kfk",
            ResourceKind::SchemaRegistry => "reg",
            ResourceKind::ServiceAccount => "sac",
            ResourceKind::Topic => "top",
        };
        format!("{}-{:06x}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn bump(counters: &DashMap<ResourceKind, u64>, kind: ResourceKind) {
        *counters.entry(kind).or_insert(0) += 1;
    }

    fn create_record(&self, kind: ResourceKind, name: &str) -> Result<ResourceHandle> {
        Self::bump(&self.creates_issued, kind);

        if let Some(message) = self.fail_creates.get(&kind) {
            return Err(ControlPlaneError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        let records = self.records(kind);
        let taken = records
            .iter()
            .any(|r| r.handle.name == name && !r.deleting);
        if taken {
            return Err(ControlPlaneError::Conflict(format!(
                "{} '{}' already exists",
                kind, name
            )));
        }

        let handle = ResourceHandle::new(self.mint_id(kind), name, kind);
        debug!("simulated create: {}", handle);
        records.insert(handle.id.clone(), Record::new(handle.clone()));
        Ok(handle)
    }

    fn list_by_name(&self, kind: ResourceKind, name: &str) -> Vec<ResourceHandle> {
        self.records(kind)
            .iter()
            .filter(|r| r.handle.name == name && !r.deleting)
            .map(|r| r.handle.clone())
            .collect()
    }

    fn delete_record(&self, kind: ResourceKind, id: &str) -> Result<()> {
        Self::bump(&self.deletes_issued, kind);

        let records = self.records(kind);
        let gone = self.profile().fetches_until_gone;
        match records.get_mut(id) {
            Some(mut record) => {
                debug!("simulated delete: {}", record.handle);
                if gone == 0 {
                    drop(record);
                    records.remove(id);
                } else {
                    record.deleting = true;
                }
                Ok(())
            }
            None => Err(ControlPlaneError::NotFound(format!("{} {}", kind, id))),
        }
    }

    /// Advance the fetch counters for a record and report its current
    /// phase. Removes the record once the deprovisioning budget is
    /// exhausted, after which fetches return not-found.
    fn observe(&self, kind: ResourceKind, id: &str) -> Result<(ResourceHandle, SimPhase)> {
        if let Some(message) = self.fail_fetches.get(&kind) {
            return Err(ControlPlaneError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        let profile = self.profile();
        let records = self.records(kind);

        let mut remove = false;
        let outcome = match records.get_mut(id) {
            Some(mut record) => {
                if record.failed {
                    Ok((record.handle.clone(), SimPhase::Failed))
                } else if record.deleting {
                    record.delete_fetches += 1;
                    if record.delete_fetches > profile.fetches_until_gone {
                        remove = true;
                        Err(ControlPlaneError::NotFound(format!("{} {}", kind, id)))
                    } else {
                        Ok((record.handle.clone(), SimPhase::Deprovisioning))
                    }
                } else {
                    record.fetches = record.fetches.saturating_add(1);
                    let phase = if record.fetches <= profile.fetches_until_ready {
                        SimPhase::Provisioning
                    } else {
                        SimPhase::Ready
                    };
                    Ok((record.handle.clone(), phase))
                }
            }
            None => Err(ControlPlaneError::NotFound(format!("{} {}", kind, id))),
        };
        if remove {
            records.remove(id);
        }
        outcome
    }

    fn instance_alive(&self, instance_id: &str) -> bool {
        self.instances
            .get(instance_id)
            .map(|r| !r.deleting)
            .unwrap_or(false)
    }
}

/// Simulated Vetra control plane backed by in-process maps.
/// SHOULD BE USED ONLY FOR TESTING PURPOSES
#[derive(Debug, Clone, Default)]
pub struct InMemoryControlPlane {
    inner: Arc<Inner>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        InMemoryControlPlane::default()
    }

    pub fn with_profile(profile: ProvisioningProfile) -> Self {
        let plane = InMemoryControlPlane::default();
        *plane.inner.profile.lock().unwrap() = profile;
        plane
    }

    pub fn kafka(&self) -> InMemoryKafkaApi {
        InMemoryKafkaApi {
            inner: self.inner.clone(),
        }
    }

    pub fn registries(&self) -> InMemoryRegistryApi {
        InMemoryRegistryApi {
            inner: self.inner.clone(),
        }
    }

    pub fn accounts(&self) -> InMemoryAccountApi {
        InMemoryAccountApi {
            inner: self.inner.clone(),
        }
    }

    pub fn topics(&self) -> InMemoryTopicApi {
        InMemoryTopicApi {
            inner: self.inner.clone(),
        }
    }

    pub fn gateway(&self) -> InMemoryGateway {
        InMemoryGateway {
            inner: self.inner.clone(),
        }
    }

    /// Insert a ready resource directly, bypassing the conflict check.
    /// Stands in for a resource left behind by another run or process.
    pub fn seed(&self, kind: ResourceKind, name: &str) -> ResourceHandle {
        let handle = ResourceHandle::new(self.inner.mint_id(kind), name, kind);
        let mut record = Record::new(handle.clone());
        record.fetches = u32::MAX;
        self.inner.records(kind).insert(handle.id.clone(), record);
        handle
    }

    /// Make every create call for the given kind fail with a 500 until
    /// cleared with [`Self::heal_creates`].
    pub fn fail_creates(&self, kind: ResourceKind, message: &str) {
        self.inner.fail_creates.insert(kind, message.to_string());
    }

    pub fn heal_creates(&self, kind: ResourceKind) {
        self.inner.fail_creates.remove(&kind);
    }

    /// Make every status fetch for the given kind fail with a 500 until
    /// cleared with [`Self::heal_fetches`].
    pub fn fail_fetches(&self, kind: ResourceKind, message: &str) {
        self.inner.fail_fetches.insert(kind, message.to_string());
    }

    pub fn heal_fetches(&self, kind: ResourceKind) {
        self.inner.fail_fetches.remove(&kind);
    }

    /// Flip the resource into a terminal failed state; subsequent status
    /// fetches report it as failed.
    pub fn mark_failed(&self, kind: ResourceKind, id: &str) {
        if let Some(mut record) = self.inner.records(kind).get_mut(id) {
            record.failed = true;
        }
    }

    pub fn creates_issued(&self, kind: ResourceKind) -> u64 {
        self.inner
            .creates_issued
            .get(&kind)
            .map(|c| *c)
            .unwrap_or(0)
    }

    pub fn deletes_issued(&self, kind: ResourceKind) -> u64 {
        self.inner
            .deletes_issued
            .get(&kind)
            .map(|c| *c)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryKafkaApi {
    inner: Arc<Inner>,
}

#[async_trait]
impl ResourceApi for InMemoryKafkaApi {
    type Payload = CreateKafkaRequest;
    type Status = KafkaInstanceStatus;

    fn kind(&self) -> ResourceKind {
        ResourceKind::KafkaInstance
    }

    async fn create(&self, payload: &Self::Payload) -> Result<ResourceHandle> {
        self.inner
            .create_record(ResourceKind::KafkaInstance, &payload.name)
    }

    async fn fetch_status(&self, id: &str) -> Result<Observation<Self::Status>> {
        let (handle, phase) = self.inner.observe(ResourceKind::KafkaInstance, id)?;
        let status = match phase {
            SimPhase::Provisioning => KafkaInstanceStatus::Provisioning,
            SimPhase::Ready => KafkaInstanceStatus::Ready,
            SimPhase::Deprovisioning => KafkaInstanceStatus::Deprovisioning,
            SimPhase::Failed => KafkaInstanceStatus::Failed,
        };
        let raw = json!({ "id": handle.id, "name": handle.name, "status": status });
        Ok(Observation::new(handle, status, raw))
    }

    async fn list_by_name(&self, name: &str) -> Result<Vec<ResourceHandle>> {
        Ok(self.inner.list_by_name(ResourceKind::KafkaInstance, name))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete_record(ResourceKind::KafkaInstance, id)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryRegistryApi {
    inner: Arc<Inner>,
}

#[async_trait]
impl ResourceApi for InMemoryRegistryApi {
    type Payload = CreateRegistryRequest;
    type Status = RegistryStatus;

    fn kind(&self) -> ResourceKind {
        ResourceKind::SchemaRegistry
    }

    async fn create(&self, payload: &Self::Payload) -> Result<ResourceHandle> {
        self.inner
            .create_record(ResourceKind::SchemaRegistry, &payload.name)
    }

    async fn fetch_status(&self, id: &str) -> Result<Observation<Self::Status>> {
        let (handle, phase) = self.inner.observe(ResourceKind::SchemaRegistry, id)?;
        let status = match phase {
            SimPhase::Provisioning => RegistryStatus::Provisioning,
            SimPhase::Failed => RegistryStatus::Failed,
            _ => RegistryStatus::Ready,
        };
        let raw = json!({ "id": handle.id, "name": handle.name, "status": status });
        Ok(Observation::new(handle, status, raw))
    }

    async fn list_by_name(&self, name: &str) -> Result<Vec<ResourceHandle>> {
        Ok(self.inner.list_by_name(ResourceKind::SchemaRegistry, name))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete_record(ResourceKind::SchemaRegistry, id)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryAccountApi {
    inner: Arc<Inner>,
}

#[async_trait]
impl ResourceApi for InMemoryAccountApi {
    type Payload = CreateServiceAccountRequest;
    type Status = Presence;

    fn kind(&self) -> ResourceKind {
        ResourceKind::ServiceAccount
    }

    async fn create(&self, payload: &Self::Payload) -> Result<ResourceHandle> {
        self.inner
            .create_record(ResourceKind::ServiceAccount, &payload.name)
    }

    async fn fetch_status(&self, id: &str) -> Result<Observation<Self::Status>> {
        let (handle, _phase) = self.inner.observe(ResourceKind::ServiceAccount, id)?;
        let raw = json!({ "id": handle.id, "name": handle.name });
        Ok(Observation::new(handle, Presence::Present, raw))
    }

    async fn list_by_name(&self, name: &str) -> Result<Vec<ResourceHandle>> {
        Ok(self.inner.list_by_name(ResourceKind::ServiceAccount, name))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete_record(ResourceKind::ServiceAccount, id)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryTopicApi {
    inner: Arc<Inner>,
}

#[async_trait]
impl ResourceApi for InMemoryTopicApi {
    type Payload = CreateTopicRequest;
    type Status = Presence;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Topic
    }

    async fn create(&self, payload: &Self::Payload) -> Result<ResourceHandle> {
        if !self.inner.instance_alive(&payload.instance_id) {
            return Err(ControlPlaneError::NotFound(format!(
                "kafka instance {}",
                payload.instance_id
            )));
        }
        let handle = self.inner.create_record(ResourceKind::Topic, &payload.name)?;
        self.inner
            .messages
            .insert((payload.instance_id.clone(), payload.name.clone()), Vec::new());
        Ok(handle)
    }

    async fn fetch_status(&self, id: &str) -> Result<Observation<Self::Status>> {
        let (handle, _phase) = self.inner.observe(ResourceKind::Topic, id)?;
        let raw = json!({ "id": handle.id, "name": handle.name });
        Ok(Observation::new(handle, Presence::Present, raw))
    }

    async fn list_by_name(&self, name: &str) -> Result<Vec<ResourceHandle>> {
        Ok(self.inner.list_by_name(ResourceKind::Topic, name))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete_record(ResourceKind::Topic, id)
    }
}

/// Produce/consume against the simulated instances. Calls fail with a
/// not-found classification once the owning instance is deleted, which is
/// what the verify-gone scenario step asserts on.
#[derive(Debug, Clone)]
pub struct InMemoryGateway {
    inner: Arc<Inner>,
}

#[async_trait]
impl MessageGateway for InMemoryGateway {
    async fn produce(&self, instance_id: &str, topic: &str, payload: &str) -> Result<()> {
        if !self.inner.instance_alive(instance_id) {
            return Err(ControlPlaneError::NotFound(format!(
                "kafka instance {}",
                instance_id
            )));
        }
        let key = (instance_id.to_string(), topic.to_string());
        match self.inner.messages.get_mut(&key) {
            Some(mut queue) => {
                queue.push(payload.to_string());
                Ok(())
            }
            None => Err(ControlPlaneError::NotFound(format!(
                "topic {} on instance {}",
                topic, instance_id
            ))),
        }
    }

    async fn consume_one(&self, instance_id: &str, topic: &str) -> Result<String> {
        if !self.inner.instance_alive(instance_id) {
            return Err(ControlPlaneError::NotFound(format!(
                "kafka instance {}",
                instance_id
            )));
        }
        let key = (instance_id.to_string(), topic.to_string());
        match self.inner.messages.get_mut(&key) {
            Some(mut queue) if !queue.is_empty() => Ok(queue.remove(0)),
            Some(_) => Err(ControlPlaneError::Unrecoverable(format!(
                "no message available on topic {}",
                topic
            ))),
            None => Err(ControlPlaneError::NotFound(format!(
                "topic {} on instance {}",
                topic, instance_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ObservedStatus;

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let plane = InMemoryControlPlane::new();
        let api = plane.kafka();
        let payload = CreateKafkaRequest::standard("mk-e2e-dup");

        api.create(&payload).await.unwrap();
        let err = api.create(&payload).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(plane.creates_issued(ResourceKind::KafkaInstance), 2);
    }

    #[tokio::test]
    async fn status_sequence_follows_the_profile() {
        let plane = InMemoryControlPlane::with_profile(ProvisioningProfile {
            fetches_until_ready: 2,
            fetches_until_gone: 1,
        });
        let api = plane.kafka();
        let handle = api
            .create(&CreateKafkaRequest::standard("mk-e2e-seq"))
            .await
            .unwrap();

        let mut labels = Vec::new();
        for _ in 0..3 {
            let observation = api.fetch_status(&handle.id).await.unwrap();
            labels.push(observation.status.label());
        }
        assert_eq!(labels, vec!["provisioning", "provisioning", "ready"]);

        api.delete(&handle.id).await.unwrap();
        let observation = api.fetch_status(&handle.id).await.unwrap();
        assert_eq!(observation.status, KafkaInstanceStatus::Deprovisioning);
        let err = api.fetch_status(&handle.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn gateway_fails_once_the_instance_is_gone() {
        let plane = InMemoryControlPlane::new();
        let kafka = plane.kafka();
        let topics = plane.topics();
        let gateway = plane.gateway();

        let instance = kafka
            .create(&CreateKafkaRequest::standard("mk-e2e-gw"))
            .await
            .unwrap();
        topics
            .create(&CreateTopicRequest {
                instance_id: instance.id.clone(),
                name: "test-topic".to_string(),
                partitions: 1,
            })
            .await
            .unwrap();

        gateway
            .produce(&instance.id, "test-topic", "hello world")
            .await
            .unwrap();
        let received = gateway.consume_one(&instance.id, "test-topic").await.unwrap();
        assert_eq!(received, "hello world");

        kafka.delete(&instance.id).await.unwrap();
        let err = gateway
            .produce(&instance.id, "test-topic", "hello world")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

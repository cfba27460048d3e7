use crate::conflict::{try_create, ConflictOutcome};
use crate::errors::Result;
use crate::observer::{wait_until_deleted, wait_until_ready, StatusSnapshot, WaitConfig};

use std::time::Duration;
use tracing::{info, warn};
use vetra_control::{NamedPayload, ResourceApi, ResourceHandle};

/// Readiness and deletion budgets for one resource kind.
///
/// The defaults mirror what the staged control plane actually needs: a
/// streaming cluster takes minutes to provision, a registry converges
/// within one, existence-only kinds are near-instant.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleConfig {
    pub ready: WaitConfig,
    pub deleted: WaitConfig,
}

impl LifecycleConfig {
    pub fn kafka_instance() -> Self {
        LifecycleConfig {
            ready: WaitConfig::new(Duration::from_secs(10), Duration::from_secs(15 * 60)),
            deleted: WaitConfig::new(Duration::from_secs(10), Duration::from_secs(5 * 60)),
        }
    }

    pub fn schema_registry() -> Self {
        LifecycleConfig {
            ready: WaitConfig::new(Duration::from_secs(3), Duration::from_secs(60)),
            deleted: WaitConfig::new(Duration::from_secs(1), Duration::from_secs(20)),
        }
    }

    pub fn service_account() -> Self {
        LifecycleConfig {
            ready: WaitConfig::new(Duration::from_secs(1), Duration::from_secs(30)),
            deleted: WaitConfig::new(Duration::from_secs(1), Duration::from_secs(20)),
        }
    }

    pub fn topic() -> Self {
        LifecycleConfig {
            ready: WaitConfig::new(Duration::from_secs(1), Duration::from_secs(30)),
            deleted: WaitConfig::new(Duration::from_secs(1), Duration::from_secs(20)),
        }
    }

    pub fn with_ready(mut self, cfg: WaitConfig) -> Self {
        self.ready = cfg;
        self
    }

    pub fn with_deleted(mut self, cfg: WaitConfig) -> Self {
        self.deleted = cfg;
        self
    }
}

/// Orchestrates the lifecycle of one resource kind: idempotent
/// create-or-reuse, bounded readiness and deletion waits, and defensive
/// cleanup by name.
#[derive(Debug, Clone)]
pub struct Lifecycle<A> {
    api: A,
    config: LifecycleConfig,
}

impl<A: ResourceApi> Lifecycle<A> {
    pub fn new(api: A, config: LifecycleConfig) -> Self {
        Lifecycle { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create the resource if no resource with the payload's name exists,
    /// then block until it is ready; otherwise reuse the first existing
    /// match without issuing a create call.
    pub async fn apply_or_reuse(&self, payload: &A::Payload) -> Result<ResourceHandle> {
        let kind = self.api.kind();
        let name = payload.name();

        let existing = self.api.list_by_name(name).await?;
        if let Some(handle) = existing.into_iter().next() {
            // names are not unique remotely; reuse whatever came first
            warn!("{} already exists, reusing: {}", kind, handle);
            return Ok(handle);
        }

        info!("create {}: {}", kind, name);
        let handle = self.api.create(payload).await?;

        let snapshot = self.wait_until_ready(&handle.id).await?;
        info!("{} ready: {}", kind, snapshot.raw);
        Ok(handle)
    }

    /// Delete every resource matching the given name, tolerating the
    /// case where none exists or another run already removed one.
    ///
    /// Attention: this deletes ALL matches, one call each, since the
    /// remote system does not enforce name uniqueness.
    pub async fn delete_by_name_if_exists(&self, name: &str) -> Result<()> {
        let kind = self.api.kind();

        let matches = self.api.list_by_name(name).await?;
        if matches.is_empty() {
            warn!("{} '{}' not found, nothing to delete", kind, name);
            return Ok(());
        }

        for handle in matches {
            info!("delete {}", handle);
            match self.api.delete(&handle.id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => warn!("{} already gone", handle),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub async fn wait_until_ready(&self, id: &str) -> Result<StatusSnapshot<A::Status>> {
        wait_until_ready(&self.api, id, self.config.ready).await
    }

    pub async fn wait_until_deleted(&self, id: &str) -> Result<()> {
        wait_until_deleted(&self.api, id, self.config.deleted).await
    }

    /// One create call with conflict absorbed as a first-class outcome.
    pub async fn try_create(&self, payload: &A::Payload) -> ConflictOutcome {
        try_create(&self.api, payload).await
    }
}

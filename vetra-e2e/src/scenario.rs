use futures::future::BoxFuture;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use vetra_control::{ResourceHandle, ResourceKind};

/// Fixture state threaded through one ordered scenario run.
///
/// Holds at most one handle per resource kind. Owned exclusively by its
/// run and passed explicitly into each step, so running several
/// scenarios in parallel (on disjoint resource names) stays safe.
#[derive(Debug, Default)]
pub struct ScenarioState {
    kafka: Option<ResourceHandle>,
    registry: Option<ResourceHandle>,
    service_account: Option<ResourceHandle>,
    topic: Option<ResourceHandle>,
}

impl ScenarioState {
    fn slot(&self, kind: ResourceKind) -> &Option<ResourceHandle> {
        match kind {
            ResourceKind::KafkaInstance => &self.kafka,
            ResourceKind::SchemaRegistry => &self.registry,
            ResourceKind::ServiceAccount => &self.service_account,
            ResourceKind::Topic => &self.topic,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut Option<ResourceHandle> {
        match kind {
            ResourceKind::KafkaInstance => &mut self.kafka,
            ResourceKind::SchemaRegistry => &mut self.registry,
            ResourceKind::ServiceAccount => &mut self.service_account,
            ResourceKind::Topic => &mut self.topic,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&ResourceHandle> {
        self.slot(kind).as_ref()
    }

    pub fn put(&mut self, handle: ResourceHandle) {
        let kind = handle.kind;
        *self.slot_mut(kind) = Some(handle);
    }

    /// Stop tracking the handle of the given kind, returning it.
    /// Used once a delete-and-verify sequence completes.
    pub fn take(&mut self, kind: ResourceKind) -> Option<ResourceHandle> {
        self.slot_mut(kind).take()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Passed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    pub elapsed: Duration,
}

/// What a step closure hands back: an error fails the step, a returned
/// handle is stored into the scenario state on success.
pub type StepResult = anyhow::Result<Option<ResourceHandle>>;

/// One ordered sequence of dependent steps exercising a full resource
/// lifecycle.
///
/// Steps run strictly one at a time. A step whose prerequisite handle is
/// missing from the state is skipped, not failed, so one upstream
/// failure does not cascade into misleading downstream failures. A
/// failing step records its error and lets the run continue.
pub struct Scenario {
    name: String,
    state: ScenarioState,
    reports: Vec<StepReport>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Scenario {
            name: name.into(),
            state: ScenarioState::default(),
            reports: Vec::new(),
        }
    }

    pub fn state(&self) -> &ScenarioState {
        &self.state
    }

    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    pub fn report(&self, step_name: &str) -> Option<&StepReport> {
        self.reports.iter().find(|r| r.name == step_name)
    }

    /// True when no step failed. Skipped steps do not fail a run on
    /// their own; the upstream failure that caused them does.
    pub fn passed(&self) -> bool {
        !self
            .reports
            .iter()
            .any(|r| matches!(r.status, StepStatus::Failed(_)))
    }

    /// Run one step, gated on its prerequisite resource kinds.
    pub async fn step<F>(
        &mut self,
        step_name: &str,
        prerequisites: &[ResourceKind],
        f: F,
    ) -> &StepReport
    where
        F: for<'a> FnOnce(&'a mut ScenarioState) -> BoxFuture<'a, StepResult>,
    {
        for kind in prerequisites {
            if self.state.get(*kind).is_none() {
                let reason = format!("prerequisite {} missing", kind);
                warn!("[{}] step '{}' skipped: {}", self.name, step_name, reason);
                self.reports.push(StepReport {
                    name: step_name.to_string(),
                    status: StepStatus::Skipped(reason),
                    elapsed: Duration::ZERO,
                });
                return self.reports.last().unwrap();
            }
        }
        self.execute(step_name, f).await
    }

    /// Run a cleanup step unconditionally, independent of earlier
    /// failures, so remote resources are not leaked across runs.
    pub async fn cleanup_step<F>(&mut self, step_name: &str, f: F) -> &StepReport
    where
        F: for<'a> FnOnce(&'a mut ScenarioState) -> BoxFuture<'a, StepResult>,
    {
        self.execute(step_name, f).await
    }

    async fn execute<F>(&mut self, step_name: &str, f: F) -> &StepReport
    where
        F: for<'a> FnOnce(&'a mut ScenarioState) -> BoxFuture<'a, StepResult>,
    {
        info!("[{}] step '{}'", self.name, step_name);
        let started = Instant::now();

        let status = match f(&mut self.state).await {
            Ok(produced) => {
                if let Some(handle) = produced {
                    info!("[{}] step '{}' produced {}", self.name, step_name, handle);
                    self.state.put(handle);
                }
                StepStatus::Passed
            }
            Err(e) => {
                error!("[{}] step '{}' failed: {:#}", self.name, step_name, e);
                StepStatus::Failed(format!("{:#}", e))
            }
        };

        self.reports.push(StepReport {
            name: step_name.to_string(),
            status,
            elapsed: started.elapsed(),
        });
        self.reports.last().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn handle(kind: ResourceKind) -> ResourceHandle {
        ResourceHandle::new("id-1", "name-1", kind)
    }

    #[tokio::test]
    async fn produced_handles_gate_dependent_steps() {
        let mut scenario = Scenario::new("gating");

        scenario
            .step("create kafka", &[], |_state: &mut ScenarioState| {
                async { Ok(Some(handle(ResourceKind::KafkaInstance))) }.boxed()
            })
            .await;

        let report = scenario
            .step(
                "create topic",
                &[ResourceKind::KafkaInstance],
                |state: &mut ScenarioState| {
                    assert!(state.get(ResourceKind::KafkaInstance).is_some());
                    async { Ok(Some(handle(ResourceKind::Topic))) }.boxed()
                },
            )
            .await;

        assert_eq!(report.status, StepStatus::Passed);
        assert!(scenario.passed());
    }

    #[tokio::test]
    async fn missing_prerequisite_skips_instead_of_failing() {
        let mut scenario = Scenario::new("skipping");

        scenario
            .step("create kafka", &[], |_state: &mut ScenarioState| {
                async { Err(anyhow::anyhow!("quota exceeded")) }.boxed()
            })
            .await;

        let report = scenario
            .step("create topic", &[ResourceKind::KafkaInstance], |_state: &mut ScenarioState| {
                panic!("skipped step must not run");
            })
            .await;

        assert!(matches!(report.status, StepStatus::Skipped(_)));
        assert!(!scenario.passed());
    }

    #[tokio::test]
    async fn cleanup_runs_after_failures() {
        let mut scenario = Scenario::new("cleanup");

        scenario
            .step("create kafka", &[], |_state: &mut ScenarioState| {
                async { Err(anyhow::anyhow!("boom")) }.boxed()
            })
            .await;

        let report = scenario
            .cleanup_step("delete kafka", |_state: &mut ScenarioState| {
                async { Ok(None) }.boxed()
            })
            .await;

        assert_eq!(report.status, StepStatus::Passed);
    }
}

use crate::errors::{E2eError, Result};
use crate::poller::{wait_for, PollOutcome, PollProgress};

use serde_json::Value;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};
use vetra_control::{Observation, ObservedStatus, Readiness, ResourceApi, ResourceHandle};

/// Poll cadence and budget for one wait operation.
///
/// Always a configuration input: readiness of a streaming cluster is a
/// matter of minutes while a registry converges within one, so the
/// per-kind constructors live in [`crate::lifecycle::LifecycleConfig`].
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        WaitConfig { interval, timeout }
    }
}

/// The last observed state of a resource during one poll session.
///
/// Overwritten on every poll tick and retained after the session exits,
/// whatever the outcome, so timeouts can report the last known state.
/// Carries the fetched handle, so a caller that entered the wait with
/// only an id gets the full identity of the resource back.
#[derive(Debug, Clone)]
pub struct StatusSnapshot<S> {
    pub handle: ResourceHandle,
    pub status: S,
    pub observed_at: SystemTime,
    pub raw: Value,
}

impl<S: ObservedStatus> StatusSnapshot<S> {
    fn from_observation(observation: Observation<S>) -> Self {
        StatusSnapshot {
            handle: observation.handle,
            status: observation.status,
            observed_at: SystemTime::now(),
            raw: observation.raw,
        }
    }

    pub fn label(&self) -> &'static str {
        self.status.label()
    }
}

fn last_observed_report<S: ObservedStatus>(last: Option<StatusSnapshot<S>>) -> String {
    match last {
        Some(snapshot) => snapshot.raw.to_string(),
        None => "never observed".to_string(),
    }
}

/// Poll the resource's status until it classifies as ready.
///
/// A not-found fetch is treated as "not provisioned yet" and retried; a
/// failed-classified status aborts the session; any other fetch error is
/// fatal (a network fault is not a readiness signal).
pub async fn wait_until_ready<A: ResourceApi>(
    api: &A,
    id: &str,
    cfg: WaitConfig,
) -> Result<StatusSnapshot<A::Status>> {
    let kind = api.kind();
    let description = format!("{} {} to be ready", kind, id);
    let started = Instant::now();

    let outcome = wait_for(&description, cfg.interval, cfg.timeout, move |is_last_attempt| {
        async move {
            match api.fetch_status(id).await {
                Ok(observation) => {
                    let snapshot = StatusSnapshot::from_observation(observation);
                    match snapshot.status.readiness() {
                        Readiness::Ready => Ok(PollProgress::Complete(snapshot)),
                        Readiness::Failed => Err(E2eError::ResourceFailed {
                            kind,
                            id: id.to_string(),
                            status: snapshot.label().to_string(),
                        }),
                        Readiness::NotReady => {
                            info!("{} {} status is: {}", kind, id, snapshot.label());
                            if is_last_attempt {
                                warn!("last {} {} response: {}", kind, id, snapshot.raw);
                            }
                            Ok(PollProgress::Pending(Some(snapshot)))
                        }
                    }
                }
                Err(e) if e.is_not_found() => {
                    debug!("{} {} not visible yet", kind, id);
                    Ok(PollProgress::Pending(None))
                }
                Err(e) => Err(E2eError::ControlPlane(e)),
            }
        }
    })
    .await;

    match outcome {
        PollOutcome::Succeeded(snapshot) => Ok(snapshot),
        PollOutcome::TimedOut(last) => Err(E2eError::ReadyTimeout {
            kind,
            id: id.to_string(),
            elapsed: started.elapsed(),
            last: last_observed_report(last),
        }),
        PollOutcome::Failed(e) => Err(e),
    }
}

/// Poll until a status fetch reports not-found.
///
/// Anything still fetchable means "not yet deleted"; so does a transient
/// fetch failure, which is logged and retried until the budget runs out.
pub async fn wait_until_deleted<A: ResourceApi>(api: &A, id: &str, cfg: WaitConfig) -> Result<()> {
    let kind = api.kind();
    let description = format!("{} {} to be deleted", kind, id);
    let started = Instant::now();

    let outcome = wait_for(&description, cfg.interval, cfg.timeout, move |is_last_attempt| {
        async move {
            match api.fetch_status(id).await {
                Ok(observation) => {
                    let snapshot = StatusSnapshot::from_observation(observation);
                    debug!("{} {} still exists: {}", kind, id, snapshot.label());
                    if is_last_attempt {
                        warn!("last {} {} response: {}", kind, id, snapshot.raw);
                    }
                    Ok(PollProgress::Pending(Some(snapshot)))
                }
                Err(e) if e.is_not_found() => Ok(PollProgress::Complete(())),
                Err(e) => {
                    warn!("fetch of {} {} failed, assuming not yet deleted: {}", kind, id, e);
                    Ok(PollProgress::Pending(None))
                }
            }
        }
    })
    .await;

    match outcome {
        PollOutcome::Succeeded(()) => {
            info!("{} {} is gone", kind, id);
            Ok(())
        }
        PollOutcome::TimedOut(last) => Err(E2eError::DeleteTimeout {
            kind,
            id: id.to_string(),
            elapsed: started.elapsed(),
            last: last_observed_report(last),
        }),
        PollOutcome::Failed(e) => Err(e),
    }
}

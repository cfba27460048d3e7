use tracing::info;
use vetra_control::{ControlPlaneError, ResourceApi, ResourceHandle};

/// Result of a conflict-tolerant create.
///
/// Creating a resource under a previously used name is an expected,
/// recoverable occurrence in a shared test environment (re-runs, shared
/// namespaces), so a conflict is a first-class outcome here rather than
/// an error to propagate.
#[derive(Debug)]
#[must_use]
pub enum ConflictOutcome {
    Created(ResourceHandle),
    AlreadyExists,
    Failed(ControlPlaneError),
}

impl ConflictOutcome {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ConflictOutcome::AlreadyExists)
    }
}

/// Issue one create call, absorbing a conflict-classified failure.
///
/// No retry and no cleanup is attempted on conflict; any other failure
/// is carried in the `Failed` variant for the caller to decide on.
pub async fn try_create<A: ResourceApi>(api: &A, payload: &A::Payload) -> ConflictOutcome {
    match api.create(payload).await {
        Ok(handle) => ConflictOutcome::Created(handle),
        Err(e) if e.is_conflict() => {
            info!("{} name is already taken: {}", api.kind(), e);
            ConflictOutcome::AlreadyExists
        }
        Err(e) => ConflictOutcome::Failed(e),
    }
}

use std::time::Duration;
use thiserror::Error;
use vetra_control::{ControlPlaneError, ResourceKind};

pub type Result<T> = std::result::Result<T, E2eError>;

#[derive(Debug, Error)]
pub enum E2eError {
    #[error("control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("{kind} {id} not ready after {elapsed:?}; last observed: {last}")]
    ReadyTimeout {
        kind: ResourceKind,
        id: String,
        elapsed: Duration,
        last: String,
    },

    #[error("{kind} {id} still exists after {elapsed:?}; last observed: {last}")]
    DeleteTimeout {
        kind: ResourceKind,
        id: String,
        elapsed: Duration,
        last: String,
    },

    #[error("{kind} {id} entered failed state: {status}")]
    ResourceFailed {
        kind: ResourceKind,
        id: String,
        status: String,
    },
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ControlPlaneError>;

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    Conflict(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("api error: status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unable to perform operation: {0}")]
    Unrecoverable(String),
}

impl ControlPlaneError {
    /// The remote system reported no resource for the given identifier.
    ///
    /// Expected terminal signal for deletion verification, recoverable
    /// "not yet" signal everywhere else.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ControlPlaneError::NotFound(_))
            || matches!(self, ControlPlaneError::Api { status: 404, .. })
    }

    /// The remote system reported that a resource with the requested
    /// name already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ControlPlaneError::Conflict(_))
            || matches!(self, ControlPlaneError::Api { status: 409, .. })
    }
}

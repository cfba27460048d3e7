use std::env;

pub const SERVICE_API_URI: &str = "VETRA_SERVICE_API_URI";
pub const NAME_POSTFIX: &str = "VETRA_NAME_POSTFIX";

const DEFAULT_SERVICE_API_URI: &str = "https://api.stage.vetra.cloud";

/// Environment-variable driven configuration for a harness run.
///
/// The postfix keeps resource names disjoint between concurrent runs
/// against the same shared control plane; it defaults to something
/// process-unique when not set by CI.
#[derive(Debug, Clone)]
pub struct Environment {
    pub service_api_uri: String,
    pub name_postfix: String,
}

impl Environment {
    pub fn from_env() -> Self {
        Environment {
            service_api_uri: env::var(SERVICE_API_URI)
                .unwrap_or_else(|_| DEFAULT_SERVICE_API_URI.to_string()),
            name_postfix: env::var(NAME_POSTFIX)
                .unwrap_or_else(|_| format!("{:x}", std::process::id())),
        }
    }

    /// Name for the e2e Kafka instance, e.g. `mk-e2e-1a2b3c`.
    pub fn instance_name(&self) -> String {
        format!("mk-e2e-{}", self.name_postfix)
    }

    /// Name for the e2e service account, e.g. `mk-e2e-sa-1a2b3c`.
    pub fn account_name(&self) -> String {
        format!("mk-e2e-sa-{}", self.name_postfix)
    }

    /// Name for the e2e schema registry, e.g. `mk-e2e-registry-1a2b3c`.
    pub fn registry_name(&self) -> String {
        format!("mk-e2e-registry-{}", self.name_postfix)
    }
}

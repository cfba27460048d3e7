#![allow(dead_code)]

use rand::{thread_rng, Rng};
use std::time::Duration;
use vetra_e2e::{LifecycleConfig, WaitConfig};

/// Unique resource name so concurrent tests never collide on the shared
/// simulated control plane.
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{:08x}", prefix, thread_rng().gen::<u32>())
}

/// Millisecond-scale budgets so lifecycle waits resolve quickly against
/// the in-memory provider.
pub fn fast_config() -> LifecycleConfig {
    LifecycleConfig::kafka_instance()
        .with_ready(WaitConfig::new(
            Duration::from_millis(10),
            Duration::from_millis(500),
        ))
        .with_deleted(WaitConfig::new(
            Duration::from_millis(10),
            Duration::from_millis(500),
        ))
}

pub fn init() {
    vetra_e2e::init_tracing();
}

//! Vetra-E2E
//!
//! End-to-end harness for the Vetra managed streaming platform control
//! plane: a bounded-interval condition poller, per-kind readiness and
//! deletion waits, lifecycle orchestration (create-or-reuse, defensive
//! delete-by-name) and an ordered scenario sequencer with prerequisite
//! gating.

pub mod errors;
pub use errors::E2eError;

mod poller;
pub use poller::{wait_for, PollOutcome, PollProgress};

mod observer;
pub use observer::{wait_until_deleted, wait_until_ready, StatusSnapshot, WaitConfig};

mod conflict;
pub use conflict::{try_create, ConflictOutcome};

mod lifecycle;
pub use lifecycle::{Lifecycle, LifecycleConfig};

mod scenario;
pub use scenario::{Scenario, ScenarioState, StepReport, StepResult, StepStatus};

mod env;
pub use env::Environment;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for harness runs and tests; safe to call from
/// every test.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

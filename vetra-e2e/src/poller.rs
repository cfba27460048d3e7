use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

/// What one probe attempt reported back to [`wait_for`].
///
/// `S` is the retained observation type; it defaults to the completion
/// type `T` for waits where the two coincide (readiness), and diverges
/// for waits whose success carries no observation (deletion).
#[derive(Debug)]
pub enum PollProgress<T, S = T> {
    /// The target condition holds; the session is over.
    Complete(T),
    /// Not there yet. An observation, if one was made, is retained so
    /// the terminal outcome can report the last known state.
    Pending(Option<S>),
}

/// Terminal result of one poll session.
#[derive(Debug)]
#[must_use]
pub enum PollOutcome<T, S, E> {
    Succeeded(T),
    /// The budget elapsed first. Carries the most recent observation,
    /// if any probe attempt produced one.
    TimedOut(Option<S>),
    Failed(E),
}

/// Wait until a probe reports completion, polling on a fixed cadence
/// within a bounded budget.
///
/// The probe runs immediately, then once per `poll_interval`. When the
/// budget expires the probe runs exactly once more with
/// `is_last_attempt = true` so it can capture full diagnostic state, and
/// that invocation is its final one. The session never spins faster than
/// `poll_interval` and never overruns `timeout` by more than one
/// interval. Dropping the returned future abandons the session and
/// releases the timer with it.
pub async fn wait_for<T, S, E, F, Fut>(
    description: &str,
    poll_interval: Duration,
    timeout: Duration,
    mut probe: F,
) -> PollOutcome<T, S, E>
where
    F: FnMut(bool) -> Fut,
    Fut: Future<Output = Result<PollProgress<T, S>, E>>,
{
    let started = Instant::now();
    let deadline = started + timeout;

    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_observed = None;
    loop {
        // first tick resolves immediately
        ticker.tick().await;

        let is_last_attempt = Instant::now() >= deadline;
        debug!(
            "wait for {}: attempt after {:?} (last: {})",
            description,
            started.elapsed(),
            is_last_attempt
        );

        match probe(is_last_attempt).await {
            Ok(PollProgress::Complete(value)) => return PollOutcome::Succeeded(value),
            Ok(PollProgress::Pending(observed)) => {
                if observed.is_some() {
                    last_observed = observed;
                }
            }
            Err(e) => return PollOutcome::Failed(e),
        }

        if is_last_attempt {
            return PollOutcome::TimedOut(last_observed);
        }
    }
}

//! Timed invocation of a single remote call
//! Failures are timed like successes and absorbed into the sample

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// How a call ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    Failure(String),
}

/// One timed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencySample {
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl LatencySample {
    pub fn success(elapsed: Duration) -> Self {
        Self {
            elapsed,
            outcome: Outcome::Success,
        }
    }

    pub fn failure(elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            elapsed,
            outcome: Outcome::Failure(error.into()),
        }
    }

    /// Whole milliseconds, the granularity used for statistics
    pub fn millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }
}

impl fmt::Display for LatencySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Success => write!(f, "{} ms", self.millis()),
            Outcome::Failure(e) => write!(f, "{} ms (failed: {})", self.millis(), e),
        }
    }
}

/// Run `call` once and time it from just before invocation to just after it resolves.
///
/// Uses the runtime clock, so tests running with paused time measure exact
/// durations.
pub async fn timed<F, Fut, T, E>(call: F) -> LatencySample
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let start = Instant::now();
    let result = call().await;
    let elapsed = start.elapsed();

    match result {
        Ok(_) => LatencySample::success(elapsed),
        Err(e) => {
            let sample = LatencySample::failure(elapsed, e.to_string());
            warn!("Failed to retrieve response: {}", sample);
            sample
        }
    }
}

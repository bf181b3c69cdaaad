//! Trial runner
//! One batch of timed calls against a fixed endpoint and client

use super::aggregate::{summarize_trial, TrialSummary};
use super::fanout::fan_out;
use super::latency::LatencySample;
use super::selector::{resolve, BoundCall};
use crate::client::NodeClient;
use crate::error::BenchError;
use crate::types::{Endpoint, Height, Transport};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Hard ceiling on one trial
pub const DEFAULT_TRIAL_TIMEOUT: Duration = Duration::from_secs(30);

/// How calls within a trial are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// One call in flight at a time
    #[default]
    Sequential,
    /// Every call on its own task, sharing one deadline
    Concurrent,
}

/// Raw result of one trial
#[derive(Debug, Clone)]
pub struct TrialRecord {
    pub endpoint: Endpoint,
    pub transport: Transport,
    /// Height used for by-height endpoints; `None` if the deadline hit during discovery
    pub height: Option<Height>,
    pub requested: usize,
    pub samples: Vec<LatencySample>,
    /// The deadline expired before `requested` samples were collected
    pub truncated: bool,
}

impl TrialRecord {
    pub fn summary(&self) -> Result<TrialSummary, BenchError> {
        summarize_trial(&self.samples, self.requested)
    }
}

#[derive(Debug, Clone)]
pub struct TrialRunner {
    volume: usize,
    deadline: Duration,
    dispatch: Dispatch,
}

impl TrialRunner {
    pub fn new(volume: usize) -> Self {
        Self {
            volume,
            deadline: DEFAULT_TRIAL_TIMEOUT,
            dispatch: Dispatch::Sequential,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Run one trial of `request` against `client`.
    ///
    /// Unknown endpoints and a zero volume fail before any call is made. One
    /// discovery call picks the height for by-height endpoints; if it fails
    /// the trial carries on at height 0. Call failures are absorbed into the
    /// samples. The deadline covers discovery and every call; when it expires
    /// the in-flight call is abandoned and the record is marked truncated.
    pub async fn run(
        &self,
        request: &str,
        client: Arc<dyn NodeClient>,
    ) -> Result<TrialRecord, BenchError> {
        let call = resolve(request, client.clone(), None)?;
        if self.volume == 0 {
            return Err(BenchError::InvalidVolume);
        }

        let endpoint = call.endpoint();
        let transport = call.transport();
        let deadline = Instant::now() + self.deadline;
        let n = self.volume;

        let height = match timeout_at(deadline, discover_height(client.as_ref())).await {
            Ok(height) => height,
            Err(_) => {
                warn!("Trial deadline expired during discovery");
                return Ok(TrialRecord {
                    endpoint,
                    transport,
                    height: None,
                    requested: n,
                    samples: Vec::new(),
                    truncated: true,
                });
            }
        };
        let call = call.at_height(height);
        if endpoint.is_by_height() {
            debug!("Benchmarking {} over {} at height {}", endpoint, transport, height);
        } else {
            debug!("Benchmarking {} over {}", endpoint, transport);
        }
        let height = call.height();

        let samples = match self.dispatch {
            Dispatch::Sequential => sequential(call, n, deadline).await,
            Dispatch::Concurrent => fan_out(call, n, deadline).await,
        };

        let truncated = samples.len() < n;
        if truncated {
            warn!(
                "Trial truncated by deadline: {}/{} samples collected",
                samples.len(),
                n
            );
        } else {
            info!("Trial complete: {} {} calls over {}", n, endpoint, transport);
        }

        Ok(TrialRecord {
            endpoint,
            transport,
            height,
            requested: n,
            samples,
            truncated,
        })
    }
}

/// Issue `n` calls one after another into a queue of capacity `n`.
async fn sequential(call: BoundCall, n: usize, deadline: Instant) -> Vec<LatencySample> {
    let (tx, mut rx) = mpsc::channel(n);

    // The producer owns the only sender; dropping it on completion or on
    // deadline closes the queue.
    let producer = async move {
        for _ in 0..n {
            let sample = call.timed().await;
            if tx.send(sample).await.is_err() {
                break;
            }
        }
    };
    if timeout_at(deadline, producer).await.is_err() {
        debug!("Abandoning in-flight call at trial deadline");
    }

    let mut samples = Vec::with_capacity(n);
    while let Some(sample) = rx.recv().await {
        samples.push(sample);
    }
    samples
}

/// Fetch the chain tip and pick a random historical height from it
async fn discover_height(client: &dyn NodeClient) -> Height {
    match client.latest_block().await {
        Ok(block) => pick_height(block.height),
        Err(e) => {
            warn!("Error fetching latest block: {}", e);
            0
        }
    }
}

fn pick_height(tip: Height) -> Height {
    if tip <= 0 {
        return 0;
    }
    rand::thread_rng().gen_range(1..=tip)
}

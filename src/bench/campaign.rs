//! Campaign runner
//! A fixed number of trials, each on a freshly opened client, averaged into one summary

use super::aggregate::{summarize_campaign, CampaignSummary, TrialSummary};
use super::trial::{Dispatch, TrialRunner, DEFAULT_TRIAL_TIMEOUT};
use crate::client::Connector;
use crate::config::BenchmarkConfig;
use crate::error::BenchError;
use crate::types::{Endpoint, Transport};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a campaign needs to know before it starts
#[derive(Debug, Clone)]
pub struct CampaignPlan {
    /// Endpoint name as given by the operator
    pub request: String,
    pub volume: usize,
    pub trials: usize,
    pub trial_timeout: Duration,
    pub dispatch: Dispatch,
}

impl CampaignPlan {
    pub fn new(request: impl Into<String>, volume: usize) -> Self {
        Self {
            request: request.into(),
            volume,
            trials: 10,
            trial_timeout: DEFAULT_TRIAL_TIMEOUT,
            dispatch: Dispatch::Sequential,
        }
    }

    /// Plan with trial count and timeout taken from configuration
    pub fn from_config(request: impl Into<String>, config: &BenchmarkConfig) -> Self {
        Self {
            trials: config.trials,
            trial_timeout: config.trial_timeout(),
            ..Self::new(request, config.request_volume)
        }
    }
}

/// Final output handed to a presentation sink
#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub endpoint: Endpoint,
    pub transport: Transport,
    pub request_volume: usize,
    pub trials: Vec<TrialSummary>,
    pub summary: CampaignSummary,
}

/// Run every trial of `plan` and average the results.
///
/// The endpoint is resolved before anything is dialed. Each trial opens its
/// own client and drops it when the trial ends. Dial failures abort the
/// campaign; call failures inside a trial do not.
pub async fn run_campaign(
    connector: &dyn Connector,
    plan: &CampaignPlan,
) -> Result<CampaignReport, BenchError> {
    let endpoint: Endpoint = plan.request.parse()?;
    if plan.volume == 0 {
        return Err(BenchError::InvalidVolume);
    }

    let transport = connector.transport();
    let runner = TrialRunner::new(plan.volume)
        .with_deadline(plan.trial_timeout)
        .with_dispatch(plan.dispatch);

    info!(
        "🚀 Campaign: {} trials of {}x {} over {}",
        plan.trials, plan.volume, endpoint, transport
    );

    let mut trials = Vec::with_capacity(plan.trials);
    for i in 0..plan.trials {
        let client = connector.connect().await?;
        let record = runner.run(&plan.request, client).await?;
        let summary = record.summary()?;
        debug!(
            "Trial {}/{}: low {} ms | avg {} ms | high {} ms | {}/{} samples",
            i + 1,
            plan.trials,
            summary.low,
            summary.avg,
            summary.high,
            summary.collected,
            summary.requested
        );
        trials.push(summary);
    }

    let summary = summarize_campaign(&trials)?;
    info!("✅ Campaign complete");

    Ok(CampaignReport {
        endpoint,
        transport,
        request_volume: plan.volume,
        trials,
        summary,
    })
}

//! Trial and campaign statistics
//! min / avg / max only, in whole milliseconds

use super::latency::LatencySample;
use crate::error::BenchError;
use serde::Serialize;

/// Reported as `low` by a trial that collected no samples
pub const NO_SAMPLES_LOW: u64 = u64::MAX;

/// Statistics of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialSummary {
    pub low: u64,
    pub avg: u64,
    pub high: u64,
    /// Volume the trial was asked for
    pub requested: usize,
    /// Samples actually collected
    pub collected: usize,
    pub failures: usize,
}

impl TrialSummary {
    pub fn is_truncated(&self) -> bool {
        self.collected < self.requested
    }

    pub fn is_empty(&self) -> bool {
        self.collected == 0
    }
}

/// Mean of each statistic over every trial of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    pub low: u64,
    pub avg: u64,
    pub high: u64,
    pub trials: usize,
    pub truncated_trials: usize,
    pub empty_trials: usize,
}

/// Reduce one trial's samples.
///
/// Failed calls count like successful ones. The average divides by the
/// `requested` volume rather than the number collected, so a truncated trial
/// reports a depressed average. With no samples at all, `low` is
/// [`NO_SAMPLES_LOW`] and `high` is 0.
pub fn summarize_trial(
    samples: &[LatencySample],
    requested: usize,
) -> Result<TrialSummary, BenchError> {
    if requested == 0 {
        return Err(BenchError::InvalidVolume);
    }

    let mut total: u128 = 0;
    let mut low = NO_SAMPLES_LOW;
    let mut high = 0u64;
    let mut failures = 0;

    for sample in samples {
        let ms = sample.millis();
        total += u128::from(ms);
        low = low.min(ms);
        high = high.max(ms);
        if !sample.is_success() {
            failures += 1;
        }
    }

    Ok(TrialSummary {
        low,
        avg: narrow(total / requested as u128),
        high,
        requested,
        collected: samples.len(),
        failures,
    })
}

/// Average the three statistics across trials, unweighted.
pub fn summarize_campaign(trials: &[TrialSummary]) -> Result<CampaignSummary, BenchError> {
    if trials.is_empty() {
        return Err(BenchError::EmptyCampaign);
    }

    let (low, avg, high) = trials.iter().fold((0u128, 0u128, 0u128), |acc, t| {
        (
            acc.0 + u128::from(t.low),
            acc.1 + u128::from(t.avg),
            acc.2 + u128::from(t.high),
        )
    });
    let n = trials.len() as u128;

    Ok(CampaignSummary {
        low: narrow(low / n),
        avg: narrow(avg / n),
        high: narrow(high / n),
        trials: trials.len(),
        truncated_trials: trials.iter().filter(|t| t.is_truncated()).count(),
        empty_trials: trials.iter().filter(|t| t.is_empty()).count(),
    })
}

// Means of u64 values always fit back into u64.
fn narrow(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

//! Benchmark module
//! Timed calls, trials, campaigns and the quick probe

pub mod aggregate;
pub mod campaign;
pub mod fanout;
pub mod latency;
pub mod probe;
pub mod selector;
pub mod trial;

#[cfg(test)]
pub(crate) mod stub;

pub use aggregate::{summarize_campaign, summarize_trial, CampaignSummary, TrialSummary};
pub use campaign::{run_campaign, CampaignPlan, CampaignReport};
pub use latency::{timed, LatencySample, Outcome};
pub use probe::{probe, ProbeReport};
pub use selector::{resolve, BoundCall};
pub use trial::{Dispatch, TrialRecord, TrialRunner};

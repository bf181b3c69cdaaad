//! Comet Companion
//!
//! Latency benchmarking for CometBFT nodes over gRPC and HTTP RPC.
//!
//! ## Architecture
//! - Client: one `NodeClient` trait, gRPC (tonic) and JSON-RPC (reqwest) implementations
//! - Bench: timed invocation, trial runner, concurrent fan-out, trial and campaign aggregation
//! - Report: text and JSON presentation sinks
//! - Config / Telemetry: YAML configuration, tracing and metrics setup

pub mod bench;
pub mod client;
pub mod config;
pub mod error;
pub mod proto;
pub mod report;
pub mod telemetry;
pub mod types;

pub use bench::{run_campaign, CampaignPlan, CampaignReport, Dispatch, TrialRunner};
pub use client::{Connector, NodeClient, TransportConnector};
pub use config::Config;
pub use error::{BenchError, ClientError, DialError};
pub use report::{JsonSink, OutputFormat, SummarySink, TextSink};
pub use types::{Endpoint, Transport};

//! Error types for clients and the benchmark harness

use thiserror::Error;

/// Failure to construct a transport client
#[derive(Debug, Error)]
pub enum DialError {
    #[error("invalid address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("failed to dial {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure of a single remote call
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("grpc status {:?}: {}", .0.code(), .0.message())]
    Status(#[from] tonic::Status),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Conditions that stop a trial or campaign from producing a summary
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("unknown endpoint '{0}' (expected LatestBlock, BlockHeight, LatestBlockResults or BlockResultsHeight)")]
    UnknownEndpoint(String),

    #[error("request volume must be a positive integer")]
    InvalidVolume,

    #[error("no trial summaries to aggregate")]
    EmptyCampaign,

    #[error(transparent)]
    Dial(#[from] DialError),
}

impl BenchError {
    /// Errors caused by bad user input rather than the environment
    pub fn is_usage(&self) -> bool {
        matches!(self, BenchError::UnknownEndpoint(_) | BenchError::InvalidVolume)
    }
}

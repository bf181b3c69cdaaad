//! Core types for the companion harness

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Block height on the target chain
pub type Height = i64;

/// Logical read operations that can be benchmarked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    LatestBlock,
    BlockHeight,
    LatestBlockResults,
    BlockResultsHeight,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::LatestBlock,
        Endpoint::BlockHeight,
        Endpoint::LatestBlockResults,
        Endpoint::BlockResultsHeight,
    ];

    /// Canonical name accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::LatestBlock => "LatestBlock",
            Endpoint::BlockHeight => "BlockHeight",
            Endpoint::LatestBlockResults => "LatestBlockResults",
            Endpoint::BlockResultsHeight => "BlockResultsHeight",
        }
    }

    /// Whether the call targets a specific height rather than the chain tip
    pub fn is_by_height(&self) -> bool {
        matches!(self, Endpoint::BlockHeight | Endpoint::BlockResultsHeight)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = crate::error::BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| crate::error::BenchError::UnknownEndpoint(s.to_string()))
    }
}

/// Client implementation used to reach the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Binary gRPC transport
    Grpc,
    /// JSON-RPC over HTTP
    Rpc,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Grpc => "grpc",
            Transport::Rpc => "rpc",
        }
    }

    /// Prefix used in probe output
    pub fn label(&self) -> &'static str {
        match self {
            Transport::Grpc => "GRPC",
            Transport::Rpc => "RPC",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grpc" => Ok(Transport::Grpc),
            "rpc" => Ok(Transport::Rpc),
            other => Err(format!("invalid transport '{}', expected grpc or rpc", other)),
        }
    }
}

/// Block as returned by either transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub height: Height,
    pub hash: String,
    pub chain_id: String,
    pub time: Option<String>,
    pub num_txs: usize,
    pub app_hash: String,
}

/// Result of executing one transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxResult {
    pub code: u32,
    pub gas_wanted: i64,
    pub gas_used: i64,
    pub log: String,
}

/// Execution results for one block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockResults {
    pub height: Height,
    pub txs_results: Vec<TxResult>,
    pub finalize_block_events: usize,
    pub app_hash: String,
}

/// Node software and protocol versions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeVersion {
    pub node: String,
    pub abci: String,
    pub p2p: u64,
    pub block: u64,
}

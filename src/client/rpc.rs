//! JSON-RPC over HTTP transport

use super::{normalize_addr, NodeClient};
use crate::error::{ClientError, DialError};
use crate::types::{Block, BlockResults, Height, NodeVersion, Transport, TxResult};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Client for the node's HTTP RPC routes (`/block`, `/block_results`, `/status`)
#[derive(Debug, Clone)]
pub struct HttpRpcClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpRpcClient {
    pub fn new(addr: &str, request_timeout: Duration) -> Result<Self, DialError> {
        let base_url = Url::parse(&normalize_addr(addr)).map_err(|e| DialError::InvalidAddress {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DialError::InvalidAddress {
                addr: addr.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { base_url, http })
    }

    fn route(&self, path: &str, height: Option<Height>) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(&format!("{}/{}", self.base_url.path().trim_end_matches('/'), path))
            .map_err(|e| ClientError::Malformed(e.to_string()))?;
        if let Some(h) = height {
            url.query_pairs_mut().append_pair("height", &h.to_string());
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        height: Option<Height>,
    ) -> Result<T, ClientError> {
        let url = self.route(path, height)?;
        // The node answers JSON-RPC errors with a non-2xx status and a JSON body,
        // so the body is decoded regardless of status.
        let body = self.http.get(url).send().await?.bytes().await?;
        decode_response(&body)
    }
}

#[async_trait]
impl NodeClient for HttpRpcClient {
    fn transport(&self) -> Transport {
        Transport::Rpc
    }

    async fn latest_block(&self) -> Result<Block, ClientError> {
        self.get::<BlockResult>("block", None).await.map(Into::into)
    }

    async fn block_by_height(&self, height: Height) -> Result<Block, ClientError> {
        self.get::<BlockResult>("block", Some(height))
            .await
            .map(Into::into)
    }

    async fn latest_block_results(&self) -> Result<BlockResults, ClientError> {
        self.get::<BlockResultsResult>("block_results", None)
            .await
            .map(Into::into)
    }

    async fn block_results(&self, height: Height) -> Result<BlockResults, ClientError> {
        self.get::<BlockResultsResult>("block_results", Some(height))
            .await
            .map(Into::into)
    }

    async fn version(&self) -> Result<NodeVersion, ClientError> {
        self.get::<StatusResult>("status", None).await.map(Into::into)
    }
}

/// JSON-RPC 2.0 envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    let response: RpcResponse<T> =
        serde_json::from_slice(body).map_err(|e| ClientError::Malformed(e.to_string()))?;

    match (response.result, response.error) {
        (_, Some(err)) => Err(ClientError::Rpc {
            code: err.code,
            message: match err.data {
                Some(data) if !data.is_empty() => format!("{} ({})", err.message, data),
                _ => err.message,
            },
        }),
        (Some(result), None) => Ok(result),
        (None, None) => Err(ClientError::Malformed(
            "response carries neither result nor error".to_string(),
        )),
    }
}

/// Heights and gas amounts are encoded as decimal strings
fn de_str_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(i64),
    }

    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Str(s) if s.is_empty() => Ok(0),
        StrOrNum::Str(s) => s.parse().map_err(serde::de::Error::custom),
        StrOrNum::Num(n) => Ok(n),
    }
}

fn de_str_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let v = de_str_i64(deserializer)?;
    u64::try_from(v).map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
struct BlockResult {
    block_id: BlockId,
    block: RawBlock,
}

#[derive(Debug, Deserialize)]
struct BlockId {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    header: RawHeader,
    #[serde(default)]
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    chain_id: String,
    #[serde(deserialize_with = "de_str_i64")]
    height: i64,
    time: Option<String>,
    #[serde(default)]
    app_hash: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    #[serde(default)]
    txs: Option<Vec<String>>,
}

impl From<BlockResult> for Block {
    fn from(r: BlockResult) -> Self {
        Block {
            height: r.block.header.height,
            hash: r.block_id.hash,
            chain_id: r.block.header.chain_id,
            time: r.block.header.time,
            num_txs: r.block.data.txs.map(|t| t.len()).unwrap_or(0),
            app_hash: r.block.header.app_hash,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlockResultsResult {
    #[serde(deserialize_with = "de_str_i64")]
    height: i64,
    #[serde(default)]
    txs_results: Option<Vec<RawTxResult>>,
    #[serde(default)]
    finalize_block_events: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    app_hash: String,
}

#[derive(Debug, Deserialize)]
struct RawTxResult {
    #[serde(default)]
    code: u32,
    #[serde(default, deserialize_with = "de_str_i64")]
    gas_wanted: i64,
    #[serde(default, deserialize_with = "de_str_i64")]
    gas_used: i64,
    #[serde(default)]
    log: String,
}

impl From<BlockResultsResult> for BlockResults {
    fn from(r: BlockResultsResult) -> Self {
        BlockResults {
            height: r.height,
            txs_results: r
                .txs_results
                .unwrap_or_default()
                .into_iter()
                .map(|t| TxResult {
                    code: t.code,
                    gas_wanted: t.gas_wanted,
                    gas_used: t.gas_used,
                    log: t.log,
                })
                .collect(),
            finalize_block_events: r.finalize_block_events.map(|e| e.len()).unwrap_or(0),
            app_hash: r.app_hash,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    node_info: NodeInfo,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    version: String,
    protocol_version: ProtocolVersion,
}

#[derive(Debug, Deserialize)]
struct ProtocolVersion {
    #[serde(deserialize_with = "de_str_u64")]
    p2p: u64,
    #[serde(deserialize_with = "de_str_u64")]
    block: u64,
    #[serde(default, deserialize_with = "de_str_u64")]
    app: u64,
}

impl From<StatusResult> for NodeVersion {
    fn from(s: StatusResult) -> Self {
        NodeVersion {
            node: s.node_info.version,
            abci: s.node_info.protocol_version.app.to_string(),
            p2p: s.node_info.protocol_version.p2p,
            block: s.node_info.protocol_version.block,
        }
    }
}

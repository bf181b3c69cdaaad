//! gRPC transport over tonic

use super::{normalize_addr, NodeClient};
use crate::error::{ClientError, DialError};
use crate::proto::v1::{
    block_results_service_client::BlockResultsServiceClient,
    block_service_client::BlockServiceClient, version_service_client::VersionServiceClient,
    BlockResponse, BlockResultsResponse, GetBlockByHeightRequest, GetBlockResultsRequest,
    GetLatestBlockRequest, GetLatestBlockResultsRequest, GetVersionRequest, GetVersionResponse,
};
use crate::types::{Block, BlockResults, Height, NodeVersion, Transport, TxResult};
use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

/// Client for the node's gRPC services.
///
/// The generated stubs are cheap clones over one shared [`Channel`], so every
/// call clones its stub instead of locking.
#[derive(Debug, Clone)]
pub struct GrpcClient {
    blocks: BlockServiceClient<Channel>,
    block_results: BlockResultsServiceClient<Channel>,
    version: VersionServiceClient<Channel>,
}

impl GrpcClient {
    /// Dial `addr` and wait for the connection to be established
    pub async fn connect(addr: &str, request_timeout: Duration) -> Result<Self, DialError> {
        let uri = normalize_addr(addr);
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| DialError::InvalidAddress {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?
            .timeout(request_timeout)
            .connect_timeout(request_timeout);

        let channel = endpoint
            .connect()
            .await
            .map_err(|source| DialError::Connect { addr: uri, source })?;

        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            blocks: BlockServiceClient::new(channel.clone()),
            block_results: BlockResultsServiceClient::new(channel.clone()),
            version: VersionServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl NodeClient for GrpcClient {
    fn transport(&self) -> Transport {
        Transport::Grpc
    }

    async fn latest_block(&self) -> Result<Block, ClientError> {
        let res = self
            .blocks
            .clone()
            .get_latest_block(GetLatestBlockRequest {})
            .await?;
        Ok(block_from_proto(res.into_inner()))
    }

    async fn block_by_height(&self, height: Height) -> Result<Block, ClientError> {
        let res = self
            .blocks
            .clone()
            .get_block_by_height(GetBlockByHeightRequest { height })
            .await?;
        Ok(block_from_proto(res.into_inner()))
    }

    async fn latest_block_results(&self) -> Result<BlockResults, ClientError> {
        let res = self
            .block_results
            .clone()
            .get_latest_block_results(GetLatestBlockResultsRequest {})
            .await?;
        Ok(block_results_from_proto(res.into_inner()))
    }

    async fn block_results(&self, height: Height) -> Result<BlockResults, ClientError> {
        let res = self
            .block_results
            .clone()
            .get_block_results(GetBlockResultsRequest { height })
            .await?;
        Ok(block_results_from_proto(res.into_inner()))
    }

    async fn version(&self) -> Result<NodeVersion, ClientError> {
        let res = self.version.clone().get_version(GetVersionRequest {}).await?;
        Ok(version_from_proto(res.into_inner()))
    }
}

fn block_from_proto(res: BlockResponse) -> Block {
    let header = res.header.unwrap_or_default();
    Block {
        height: header.height,
        hash: hex::encode_upper(&res.block_id_hash),
        chain_id: header.chain_id,
        time: header.time.map(|t| t.to_string()),
        num_txs: res.txs.len(),
        app_hash: hex::encode_upper(&header.app_hash),
    }
}

fn block_results_from_proto(res: BlockResultsResponse) -> BlockResults {
    BlockResults {
        height: res.height,
        txs_results: res
            .txs_results
            .into_iter()
            .map(|r| TxResult {
                code: r.code,
                gas_wanted: r.gas_wanted,
                gas_used: r.gas_used,
                log: r.log,
            })
            .collect(),
        finalize_block_events: res.finalize_block_events.len(),
        app_hash: hex::encode_upper(&res.app_hash),
    }
}

fn version_from_proto(res: GetVersionResponse) -> NodeVersion {
    NodeVersion {
        node: res.node,
        abci: res.abci,
        p2p: res.p2p,
        block: res.block,
    }
}

//! Node clients
//! One capability trait, two transports

pub mod grpc;
pub mod rpc;

pub use grpc::GrpcClient;
pub use rpc::HttpRpcClient;

use crate::config::AppConfig;
use crate::error::{ClientError, DialError};
use crate::types::{Block, BlockResults, Height, NodeVersion, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Read operations the harness needs from a node.
///
/// Both transports expose the same surface, so everything above the
/// [`Connector`] works against `Arc<dyn NodeClient>` without knowing which
/// one it holds.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Transport this client speaks
    fn transport(&self) -> Transport;

    async fn latest_block(&self) -> Result<Block, ClientError>;

    async fn block_by_height(&self, height: Height) -> Result<Block, ClientError>;

    async fn latest_block_results(&self) -> Result<BlockResults, ClientError>;

    async fn block_results(&self, height: Height) -> Result<BlockResults, ClientError>;

    async fn version(&self) -> Result<NodeVersion, ClientError>;
}

/// Opens a fresh client. Called once per trial.
#[async_trait]
pub trait Connector: Send + Sync {
    fn transport(&self) -> Transport;

    async fn connect(&self) -> Result<Arc<dyn NodeClient>, DialError>;
}

/// Builds real clients from the configured node addresses
#[derive(Debug, Clone)]
pub struct TransportConnector {
    transport: Transport,
    addr: String,
    request_timeout: Duration,
}

impl TransportConnector {
    pub fn new(transport: Transport, app: &AppConfig, request_timeout: Duration) -> Self {
        let addr = match transport {
            Transport::Grpc => app.grpc.clone(),
            Transport::Rpc => app.rpc.clone(),
        };
        Self {
            transport,
            addr,
            request_timeout,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl Connector for TransportConnector {
    fn transport(&self) -> Transport {
        self.transport
    }

    async fn connect(&self) -> Result<Arc<dyn NodeClient>, DialError> {
        debug!("Dialing {} node at {}", self.transport, self.addr());
        let client: Arc<dyn NodeClient> = match self.transport {
            Transport::Grpc => Arc::new(GrpcClient::connect(&self.addr, self.request_timeout).await?),
            Transport::Rpc => Arc::new(HttpRpcClient::new(&self.addr, self.request_timeout)?),
        };
        info!("Connected to {} node at {}", self.transport, self.addr());
        Ok(client)
    }
}

/// Prefix `http://` when the address carries no scheme
pub(crate) fn normalize_addr(addr: &str) -> String {
    let addr = addr.trim().trim_end_matches('/');
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

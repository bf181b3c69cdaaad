//! Endpoint resolution
//! Maps a logical endpoint onto the matching client call

use super::latency::{timed, LatencySample};
use crate::client::NodeClient;
use crate::error::{BenchError, ClientError};
use crate::telemetry;
use crate::types::{Endpoint, Height, Transport};
use std::sync::Arc;

/// A client call with its endpoint and height fixed, ready to be invoked repeatedly
#[derive(Clone)]
pub struct BoundCall {
    endpoint: Endpoint,
    height: Option<Height>,
    client: Arc<dyn NodeClient>,
}

impl BoundCall {
    /// `height` is ignored by the latest-* endpoints. A by-height endpoint
    /// without a height falls back to the chain tip.
    pub fn new(endpoint: Endpoint, client: Arc<dyn NodeClient>, height: Option<Height>) -> Self {
        Self {
            endpoint,
            height,
            client,
        }
    }

    /// The same call pinned to `height`
    pub fn at_height(self, height: Height) -> Self {
        Self {
            height: Some(height),
            ..self
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn transport(&self) -> Transport {
        self.client.transport()
    }

    pub fn height(&self) -> Option<Height> {
        self.height
    }

    /// Issue the call once, discarding the payload
    pub async fn invoke(&self) -> Result<(), ClientError> {
        match (self.endpoint, self.height) {
            (Endpoint::LatestBlock, _) | (Endpoint::BlockHeight, None) => {
                self.client.latest_block().await.map(drop)
            }
            (Endpoint::BlockHeight, Some(h)) => self.client.block_by_height(h).await.map(drop),
            (Endpoint::LatestBlockResults, _) | (Endpoint::BlockResultsHeight, None) => {
                self.client.latest_block_results().await.map(drop)
            }
            (Endpoint::BlockResultsHeight, Some(h)) => {
                self.client.block_results(h).await.map(drop)
            }
        }
    }

    /// Timed invocation, recorded in metrics
    pub async fn timed(&self) -> LatencySample {
        let sample = timed(|| self.invoke()).await;
        telemetry::record_sample(self.endpoint, self.transport(), &sample);
        sample
    }
}

/// Resolve an endpoint name against a connected client.
///
/// Unknown names fail before anything is sent to the node.
pub fn resolve(
    name: &str,
    client: Arc<dyn NodeClient>,
    height: Option<Height>,
) -> Result<BoundCall, BenchError> {
    let endpoint: Endpoint = name.parse()?;
    Ok(BoundCall::new(endpoint, client, height))
}

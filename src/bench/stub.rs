//! Scripted in-memory node client for harness tests

use crate::client::{Connector, NodeClient};
use crate::error::{ClientError, DialError};
use crate::types::{Block, BlockResults, Height, NodeVersion, Transport};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    LatestBlock,
    BlockByHeight(Height),
    LatestBlockResults,
    BlockResults(Height),
    Version,
}

/// Every call sleeps for `delay` (or its per-call override) on the runtime
/// clock. Calls are numbered from 1 across all methods, discovery included.
pub struct StubClient {
    transport: Transport,
    tip: Option<Height>,
    delay: Duration,
    delay_overrides: HashMap<usize, Duration>,
    failing: HashSet<usize>,
    counter: AtomicUsize,
    log: Mutex<Vec<StubCall>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self {
            transport: Transport::Grpc,
            tip: Some(100),
            delay: Duration::ZERO,
            delay_overrides: HashMap::new(),
            failing: HashSet::new(),
            counter: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_call_delay(mut self, call: usize, delay: Duration) -> Self {
        self.delay_overrides.insert(call, delay);
        self
    }

    /// Chain tip reported by `latest_block`. `None` makes `latest_block` fail.
    pub fn with_tip(mut self, tip: Option<Height>) -> Self {
        self.tip = tip;
        self
    }

    pub fn fail_call(mut self, call: usize) -> Self {
        self.failing.insert(call);
        self
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: StubCall) -> Result<(), ClientError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.lock().unwrap().push(call);

        let delay = self.delay_overrides.get(&n).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&n) {
            return Err(ClientError::Malformed(format!("scripted failure on call {}", n)));
        }
        Ok(())
    }
}

#[async_trait]
impl NodeClient for StubClient {
    fn transport(&self) -> Transport {
        self.transport
    }

    async fn latest_block(&self) -> Result<Block, ClientError> {
        self.enter(StubCall::LatestBlock).await?;
        let height = self
            .tip
            .ok_or_else(|| ClientError::Malformed("no chain tip".to_string()))?;
        Ok(Block {
            height,
            ..Block::default()
        })
    }

    async fn block_by_height(&self, height: Height) -> Result<Block, ClientError> {
        self.enter(StubCall::BlockByHeight(height)).await?;
        Ok(Block {
            height,
            ..Block::default()
        })
    }

    async fn latest_block_results(&self) -> Result<BlockResults, ClientError> {
        self.enter(StubCall::LatestBlockResults).await?;
        Ok(BlockResults {
            height: self.tip.unwrap_or_default(),
            ..BlockResults::default()
        })
    }

    async fn block_results(&self, height: Height) -> Result<BlockResults, ClientError> {
        self.enter(StubCall::BlockResults(height)).await?;
        Ok(BlockResults {
            height,
            ..BlockResults::default()
        })
    }

    async fn version(&self) -> Result<NodeVersion, ClientError> {
        self.enter(StubCall::Version).await?;
        Ok(NodeVersion {
            node: "stub".to_string(),
            ..NodeVersion::default()
        })
    }
}

/// Hands out the same stub client on every connect and counts the dials
pub struct StubConnector {
    client: Option<Arc<StubClient>>,
    transport: Transport,
    connects: AtomicUsize,
}

impl StubConnector {
    pub fn new(client: Arc<StubClient>) -> Self {
        Self {
            transport: client.transport,
            client: Some(client),
            connects: AtomicUsize::new(0),
        }
    }

    /// Every dial fails
    pub fn unreachable(transport: Transport) -> Self {
        Self {
            client: None,
            transport,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for StubConnector {
    fn transport(&self) -> Transport {
        self.transport
    }

    async fn connect(&self) -> Result<Arc<dyn NodeClient>, DialError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.client {
            Some(client) => Ok(client.clone()),
            None => Err(DialError::InvalidAddress {
                addr: "stub".to_string(),
                reason: "unreachable".to_string(),
            }),
        }
    }
}

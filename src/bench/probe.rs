//! One-shot probe of every read endpoint on a transport

use super::latency::{timed, LatencySample};
use crate::client::NodeClient;
use crate::types::{Height, Transport};
use std::time::Duration;
use tokio::time::Instant;

/// Height used for the by-height probe calls
pub const PROBE_HEIGHT: Height = 1;

#[derive(Debug, Clone)]
pub struct ProbeLine {
    pub label: &'static str,
    pub sample: LatencySample,
}

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub transport: Transport,
    pub lines: Vec<ProbeLine>,
    pub total: Duration,
}

/// Time one call of each kind. Failures are recorded on their line and the probe moves on.
pub async fn probe(client: &dyn NodeClient) -> ProbeReport {
    let start = Instant::now();
    let mut lines = Vec::with_capacity(5);

    lines.push(ProbeLine {
        label: "Get Version",
        sample: timed(|| client.version()).await,
    });
    lines.push(ProbeLine {
        label: "Get Block Results",
        sample: timed(|| client.block_results(PROBE_HEIGHT)).await,
    });
    lines.push(ProbeLine {
        label: "Get Latest Block Results",
        sample: timed(|| client.latest_block_results()).await,
    });
    lines.push(ProbeLine {
        label: "Get Latest Block",
        sample: timed(|| client.latest_block()).await,
    });
    lines.push(ProbeLine {
        label: "Get Block",
        sample: timed(|| client.block_by_height(PROBE_HEIGHT)).await,
    });

    ProbeReport {
        transport: client.transport(),
        lines,
        total: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::stub::{StubCall, StubClient};

    #[tokio::test(start_paused = true)]
    async fn test_probe_covers_every_endpoint() {
        let stub = StubClient::new()
            .with_transport(Transport::Rpc)
            .with_delay(Duration::from_millis(3))
            .fail_call(2);

        let report = probe(&stub).await;

        assert_eq!(report.transport, Transport::Rpc);
        assert_eq!(report.lines.len(), 5);
        assert!(!report.lines[1].sample.is_success());
        assert!(report.lines.iter().all(|l| l.sample.millis() == 3));
        assert_eq!(report.total, Duration::from_millis(15));
        assert_eq!(
            stub.calls(),
            vec![
                StubCall::Version,
                StubCall::BlockResults(1),
                StubCall::LatestBlockResults,
                StubCall::LatestBlock,
                StubCall::BlockByHeight(1),
            ]
        );
    }
}

//! End-to-end tests against a mocked HTTP JSON-RPC node

use comet_companion::bench::{probe, CampaignPlan, TrialRunner};
use comet_companion::client::{HttpRpcClient, NodeClient, TransportConnector};
use comet_companion::config::AppConfig;
use comet_companion::{run_campaign, ClientError, Transport};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const TIP: i64 = 120;
const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy)]
enum Route {
    Block,
    BlockResults,
}

/// Serves the requested height, or the tip when none is given
struct ChainResponder(Route);

impl Respond for ChainResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let height = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "height")
            .and_then(|(_, value)| value.parse::<i64>().ok())
            .unwrap_or(TIP);

        let result = match self.0 {
            Route::Block => json!({
                "block_id": { "hash": format!("FEED{:04}", height) },
                "block": {
                    "header": {
                        "chain_id": "companion-test",
                        "height": height.to_string(),
                        "time": "2024-05-01T12:00:00Z",
                        "app_hash": "AA"
                    },
                    "data": { "txs": ["dHgx"] }
                }
            }),
            Route::BlockResults => json!({
                "height": height.to_string(),
                "txs_results": [
                    { "code": 0, "gas_wanted": "1000", "gas_used": "900", "log": "" }
                ],
                "finalize_block_events": [],
                "app_hash": "BB"
            }),
        };
        ResponseTemplate::new(200).set_body_json(envelope("result", result))
    }
}

fn envelope(key: &str, value: Value) -> Value {
    let mut body = json!({ "jsonrpc": "2.0", "id": -1 });
    body[key] = value;
    body
}

fn height_error(height: i64) -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(envelope(
        "error",
        json!({
            "code": -32603,
            "message": "Internal error",
            "data": format!(
                "height {} must be less than or equal to the current blockchain height {}",
                height, TIP
            )
        }),
    ))
}

/// Node at height `TIP`. One past the tip answers with a JSON-RPC error and a 500.
async fn start_node() -> MockServer {
    let server = MockServer::start().await;
    let beyond_tip = (TIP + 1).to_string();

    for (route, responder) in [
        ("/block", Route::Block),
        ("/block_results", Route::BlockResults),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("height", beyond_tip.as_str()))
            .respond_with(height_error(TIP + 1))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ChainResponder(responder))
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "result",
            json!({
                "node_info": {
                    "version": "0.38.7",
                    "protocol_version": { "p2p": "8", "block": "11", "app": "0" }
                }
            }),
        )))
        .mount(&server)
        .await;

    server
}

fn client(server: &MockServer) -> HttpRpcClient {
    HttpRpcClient::new(&server.uri(), TIMEOUT).unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_queries() {
    let server = start_node().await;
    let client = client(&server);

    let latest = client.latest_block().await.unwrap();
    assert_eq!(latest.height, TIP);
    assert_eq!(latest.hash, "FEED0120");
    assert_eq!(latest.num_txs, 1);
    assert_eq!(latest.time.as_deref(), Some("2024-05-01T12:00:00Z"));

    let block = client.block_by_height(3).await.unwrap();
    assert_eq!(block.height, 3);

    let results = client.block_results(3).await.unwrap();
    assert_eq!(results.height, 3);
    assert_eq!(results.txs_results[0].gas_wanted, 1000);
    assert_eq!(results.finalize_block_events, 0);

    let version = client.version().await.unwrap();
    assert_eq!(version.node, "0.38.7");
    assert_eq!(version.p2p, 8);
}

#[tokio::test]
async fn test_height_is_sent_as_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/block"))
        .and(query_param("height", "7"))
        .respond_with(ChainResponder(Route::Block))
        .expect(1)
        .mount(&server)
        .await;

    let block = client(&server).block_by_height(7).await.unwrap();
    assert_eq!(block.height, 7);
}

#[tokio::test]
async fn test_error_body_on_non_2xx_status() {
    let server = start_node().await;

    match client(&server).block_results(TIP + 1).await {
        Err(ClientError::Rpc { code, message }) => {
            assert_eq!(code, -32603);
            assert!(message.contains("current blockchain height 120"));
        }
        other => panic!("expected rpc error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unmocked_route_is_malformed() {
    let server = MockServer::start().await;

    let err = client(&server).version().await.unwrap_err();
    assert!(matches!(err, ClientError::Malformed(_)));
}

#[tokio::test]
async fn test_trial_at_discovered_height() {
    let server = start_node().await;
    let client: Arc<dyn NodeClient> = Arc::new(client(&server));

    let record = TrialRunner::new(4)
        .with_deadline(TIMEOUT)
        .run("BlockResultsHeight", client)
        .await
        .unwrap();

    assert!(!record.truncated);
    assert!((1..=TIP).contains(&record.height.unwrap()));
    assert!(record.samples.iter().all(|s| s.is_success()));
    // discovery plus four calls
    assert_eq!(request_count(&server).await, 5);
}

#[tokio::test]
async fn test_campaign() {
    let server = start_node().await;
    let app = AppConfig {
        rpc: server.uri(),
        ..AppConfig::default()
    };
    let connector = TransportConnector::new(Transport::Rpc, &app, TIMEOUT);

    let mut plan = CampaignPlan::new("LatestBlock", 3);
    plan.trials = 2;
    plan.trial_timeout = TIMEOUT;

    let report = run_campaign(&connector, &plan).await.unwrap();
    assert_eq!(report.transport, Transport::Rpc);
    assert_eq!(report.summary.trials, 2);
    assert!(report.trials.iter().all(|t| t.collected == 3 && t.failures == 0));
}

#[tokio::test]
async fn test_probe() {
    let server = start_node().await;
    let report = probe(&client(&server)).await;

    assert_eq!(report.transport, Transport::Rpc);
    assert_eq!(report.lines.len(), 5);
    assert!(report.lines.iter().all(|l| l.sample.is_success()));
}

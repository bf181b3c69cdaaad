//! Concurrent fan-out
//! One task per call, a shared result queue and a single deadline token

use super::latency::LatencySample;
use super::selector::BoundCall;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Issue `n` copies of `call` in parallel and collect whatever finishes before `deadline`.
///
/// Every task races its call against the same cancellation token, which a
/// single timer cancels at the deadline. Samples arrive in completion order.
pub async fn fan_out(call: BoundCall, n: usize, deadline: Instant) -> Vec<LatencySample> {
    let (tx, mut rx) = mpsc::channel(n.max(1));
    let token = CancellationToken::new();
    if Instant::now() >= deadline {
        token.cancel();
    }

    let timer = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            token.cancel();
        })
    };

    let mut tasks = JoinSet::new();
    for _ in 0..n {
        let call = call.clone();
        let tx = tx.clone();
        let token = token.clone();
        tasks.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                sample = call.timed() => {
                    tx.send(sample).await.ok();
                }
            }
        });
    }
    drop(tx);

    // Barrier: every task either reported or was cancelled
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!("Fan-out task failed: {}", e);
        }
    }
    timer.abort();

    if token.is_cancelled() {
        debug!("Fan-out deadline reached, outstanding calls abandoned");
    }

    let mut samples = Vec::with_capacity(n);
    while let Some(sample) = rx.recv().await {
        samples.push(sample);
    }
    samples
}

//! Logging and metrics setup

use crate::bench::LatencySample;
use crate::config::{LoggingConfig, MetricsConfig};
use crate::types::{Endpoint, Transport};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
///
/// Logs go to stderr; stdout is reserved for results.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if config.json_output {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Start the Prometheus scrape endpoint if one is configured.
///
/// Must be called from within the tokio runtime.
pub fn init_metrics(config: &MetricsConfig) -> anyhow::Result<()> {
    if let Some(addr) = config.listen {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("📊 Serving metrics on http://{}/metrics", addr);
    }
    Ok(())
}

/// Record one benchmarked call
pub fn record_sample(endpoint: Endpoint, transport: Transport, sample: &LatencySample) {
    let outcome = if sample.is_success() { "success" } else { "failure" };
    metrics::counter!(
        "companion_calls_total",
        "endpoint" => endpoint.name(),
        "transport" => transport.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "companion_call_latency_ms",
        "endpoint" => endpoint.name(),
        "transport" => transport.as_str()
    )
    .record(sample.elapsed.as_secs_f64() * 1000.0);
}

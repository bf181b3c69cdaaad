//! Comet Companion CLI
//! Benchmark or query a node's gRPC and RPC endpoints

use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use comet_companion::bench::{probe, CampaignPlan, Dispatch};
use comet_companion::client::{Connector, TransportConnector};
use comet_companion::report::{
    render_block, render_block_results, render_probe, OutputFormat, SummarySink,
};
use comet_companion::types::{Height, Transport};
use comet_companion::{run_campaign, telemetry, BenchError, Config};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "companion")]
#[command(about = "Comet Companion: benchmark or perform requests against Comet's gRPC and RPC endpoints")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time one call of every endpoint on a transport
    Benchmark {
        /// grpc or rpc
        transport: Transport,
    },

    /// Run repeated trials against one endpoint and report min/avg/max
    Campaign {
        /// Number of requests per trial
        #[arg(long = "reqVol")]
        req_vol: Option<usize>,

        /// Endpoint to benchmark
        #[arg(long, default_value = "LatestBlock")]
        request: String,

        /// Benchmark gRPC (false selects HTTP RPC)
        #[arg(long = "GRPC", default_value_t = true, action = ArgAction::Set)]
        grpc: bool,

        /// Number of trials
        #[arg(long)]
        trials: Option<usize>,

        /// Deadline for each trial in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Issue each trial's requests in parallel
        #[arg(long)]
        concurrent: bool,

        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// gRPC client subcommands
    Grpc {
        #[command(subcommand)]
        command: QueryCommand,
    },

    /// HTTP RPC client subcommands
    Rpc {
        #[command(subcommand)]
        command: QueryCommand,
    },
}

#[derive(Subcommand)]
enum QueryCommand {
    /// Get the latest block, or the block at --height when [latest] is false
    Block {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        latest: bool,

        #[arg(long, default_value_t = 0)]
        height: Height,
    },

    /// Get the latest block results, or those at --height when [latest] is false
    #[command(name = "block-result")]
    BlockResult {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        latest: bool,

        #[arg(long, default_value_t = 0)]
        height: Height,
    },
}

/// Bad command line input that clap cannot catch
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct UsageError(String);

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let usage = err.is::<UsageError>()
        || err
            .downcast_ref::<BenchError>()
            .map(BenchError::is_usage)
            .unwrap_or(false);
    if usage {
        2
    } else {
        1
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = Config::locate(cli.config.as_deref());
    let config = Config::load(Some(config_path.as_path()))?;

    telemetry::init_logging(&config.logging)?;
    if config_path.exists() {
        info!("✅ Configuration loaded from {}", config_path.display());
    } else {
        warn!("Config {} not found, using defaults", config_path.display());
    }
    info!("   gRPC: {} | RPC: {}", config.app.grpc, config.app.rpc);
    telemetry::init_metrics(&config.metrics)?;

    match cli.command {
        Commands::Benchmark { transport } => run_probe(transport, &config).await,
        Commands::Campaign {
            req_vol,
            request,
            grpc,
            trials,
            timeout_secs,
            concurrent,
            format,
        } => {
            let mut plan = CampaignPlan::from_config(request, &config.benchmark);
            if let Some(volume) = req_vol {
                plan.volume = volume;
            }
            if let Some(trials) = trials {
                plan.trials = trials;
            }
            if let Some(secs) = timeout_secs {
                plan.trial_timeout = std::time::Duration::from_secs(secs);
            }
            if concurrent {
                plan.dispatch = Dispatch::Concurrent;
            }
            let transport = if grpc { Transport::Grpc } else { Transport::Rpc };
            let format: OutputFormat = format.parse().map_err(UsageError)?;

            let connector = TransportConnector::new(transport, &config.app, plan.trial_timeout);
            let report = run_campaign(&connector, &plan).await?;

            let mut out = io::stdout().lock();
            format.sink().render(&report, &mut out)?;
            out.flush()?;
            Ok(())
        }
        Commands::Grpc { command } => run_query(Transport::Grpc, command, &config).await,
        Commands::Rpc { command } => run_query(Transport::Rpc, command, &config).await,
    }
}

async fn run_probe(transport: Transport, config: &Config) -> anyhow::Result<()> {
    let timeout = config.benchmark.trial_timeout();
    let connector = TransportConnector::new(transport, &config.app, timeout);
    let client = connector.connect().await?;

    let report = tokio::time::timeout(timeout, probe(client.as_ref()))
        .await
        .with_context(|| format!("probe did not finish within {:?}", timeout))?;

    let mut out = io::stdout().lock();
    render_probe(&report, &mut out)?;
    out.flush()?;
    Ok(())
}

async fn run_query(transport: Transport, command: QueryCommand, config: &Config) -> anyhow::Result<()> {
    let connector =
        TransportConnector::new(transport, &config.app, config.benchmark.trial_timeout());

    match command {
        QueryCommand::Block { latest, height } => {
            let height = target_height("Block", latest, height)?;
            let client = connector.connect().await?;
            let block = match height {
                None => client.latest_block().await?,
                Some(h) => client.block_by_height(h).await?,
            };
            render_block(&block, &mut io::stdout().lock())?;
        }
        QueryCommand::BlockResult { latest, height } => {
            let height = target_height("BlockResult", latest, height)?;
            let client = connector.connect().await?;
            let results = match height {
                None => client.latest_block_results().await?,
                Some(h) => client.block_results(h).await?,
            };
            render_block_results(&results, &mut io::stdout().lock())?;
        }
    }
    Ok(())
}

fn target_height(kind: &str, latest: bool, height: Height) -> Result<Option<Height>, UsageError> {
    if latest {
        Ok(None)
    } else if height <= 0 {
        Err(UsageError(format!(
            "invalid height for Get {} latest=false: pass --height",
            kind
        )))
    } else {
        Ok(Some(height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_campaign_flags() {
        let cli = Cli::try_parse_from([
            "companion",
            "campaign",
            "--reqVol",
            "25",
            "--request",
            "BlockResultsHeight",
            "--GRPC",
            "false",
        ])
        .unwrap();

        match cli.command {
            Commands::Campaign {
                req_vol,
                request,
                grpc,
                concurrent,
                ..
            } => {
                assert_eq!(req_vol, Some(25));
                assert_eq!(request, "BlockResultsHeight");
                assert!(!grpc);
                assert!(!concurrent);
            }
            _ => panic!("expected campaign"),
        }
    }

    #[test]
    fn test_campaign_defaults() {
        let cli = Cli::try_parse_from(["companion", "campaign"]).unwrap();
        match cli.command {
            Commands::Campaign {
                req_vol,
                request,
                grpc,
                format,
                ..
            } => {
                assert_eq!(req_vol, None);
                assert_eq!(request, "LatestBlock");
                assert!(grpc);
                assert_eq!(format, "text");
            }
            _ => panic!("expected campaign"),
        }
    }

    #[test]
    fn test_benchmark_requires_known_transport() {
        assert!(Cli::try_parse_from(["companion", "benchmark", "grpc"]).is_ok());
        assert!(Cli::try_parse_from(["companion", "benchmark", "http"]).is_err());
        assert!(Cli::try_parse_from(["companion", "benchmark"]).is_err());
    }

    #[test]
    fn test_query_command() {
        let cli = Cli::try_parse_from(["companion", "rpc", "block-result", "false", "--height", "12"])
            .unwrap();
        match cli.command {
            Commands::Rpc {
                command: QueryCommand::BlockResult { latest, height },
            } => {
                assert!(!latest);
                assert_eq!(height, 12);
            }
            _ => panic!("expected rpc block-result"),
        }
    }

    #[test]
    fn test_target_height() {
        assert_eq!(target_height("Block", true, 0).unwrap(), None);
        assert_eq!(target_height("Block", false, 7).unwrap(), Some(7));
        assert!(target_height("Block", false, 0).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&BenchError::UnknownEndpoint("Bogus".into()).into()), 2);
        assert_eq!(exit_code(&BenchError::InvalidVolume.into()), 2);
        assert_eq!(exit_code(&BenchError::EmptyCampaign.into()), 1);
        assert_eq!(exit_code(&UsageError("bad".into()).into()), 2);
        assert_eq!(exit_code(&anyhow::anyhow!("connection refused")), 1);
    }
}

//! Configuration module

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Everything read from `config.yaml`, each section optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Node addresses
    pub app: AppConfig,

    /// Harness settings
    pub benchmark: BenchmarkConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Prometheus exporter settings
    pub metrics: MetricsConfig,
}

/// Addresses of the node under test, one per transport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rpc: String,
    pub grpc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Trials per campaign
    pub trials: usize,
    /// Calls per trial
    pub request_volume: usize,
    /// Hard ceiling on one trial's wall-clock time
    pub trial_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_output: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics on this address while running
    pub listen: Option<SocketAddr>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: "http://127.0.0.1:26657".to_string(),
            grpc: "http://127.0.0.1:26090".to_string(),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            request_volume: 10,
            trial_timeout_secs: 30,
        }
    }
}

impl BenchmarkConfig {
    pub fn trial_timeout(&self) -> Duration {
        Duration::from_secs(self.trial_timeout_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
        }
    }
}

impl Config {
    /// Resolve the config file: `path`, then `COMPANION_CONFIG`, then `config.yaml`
    pub fn locate(path: Option<&Path>) -> PathBuf {
        match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("COMPANION_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        }
    }

    /// Load and validate config.
    ///
    /// A missing file yields defaults. A file that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = Self::locate(path);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading config {}", config_path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("parsing config {}", config_path.display()))?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `COMPANION_RPC_ADDR` / `COMPANION_GRPC_ADDR` overrides
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rpc) = lookup("COMPANION_RPC_ADDR") {
            self.app.rpc = rpc;
        }
        if let Some(grpc) = lookup("COMPANION_GRPC_ADDR") {
            self.app.grpc = grpc;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.app.rpc.trim().is_empty() {
            bail!("app.rpc must not be empty");
        }
        if self.app.grpc.trim().is_empty() {
            bail!("app.grpc must not be empty");
        }
        if self.benchmark.request_volume == 0 {
            bail!("benchmark.request_volume must be positive");
        }
        if self.benchmark.trial_timeout_secs == 0 {
            bail!("benchmark.trial_timeout_secs must be positive");
        }
        Ok(())
    }
}

use super::client::{ExponentialBackoff, SocketConfig};
use crate::domain::{DexRegistry, ScannerFilter, SupportedChainName};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// REST base URL (`GET {api_base_url}/scanner`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Websocket endpoint
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log file used by the dashboard
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Optional heartbeat sent over the websocket
    #[serde(default)]
    pub heartbeat: Option<HeartbeatConfig>,
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Tables shown side by side, in order
    #[serde(default = "default_tables")]
    pub tables: Vec<TableConfig>,
    /// Extra router → DEX slug entries
    #[serde(default)]
    pub dexes: Vec<DexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// None = retry forever
    #[serde(default)]
    pub max_attempts: Option<usize>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    pub interval_secs: u64,
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Rows mounted above and below the visible window
    #[serde(default = "default_overscan")]
    pub overscan: usize,
    /// Load the next page when the last visible row is this close to the end
    #[serde(default = "default_end_reached_threshold")]
    pub end_reached_threshold: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            overscan: default_overscan(),
            end_reached_threshold: default_end_reached_threshold(),
        }
    }
}

/// Filter preset a table starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TablePreset {
    Trending,
    New,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub title: String,
    pub preset: TablePreset,
    /// Restrict the table to one chain
    #[serde(default)]
    pub chain: Option<SupportedChainName>,
}

impl TableConfig {
    /// Scanner filter for this table
    pub fn filter(&self) -> ScannerFilter {
        let base = match self.preset {
            TablePreset::Trending => ScannerFilter::trending(),
            TablePreset::New => ScannerFilter::new_tokens(),
        };
        ScannerFilter {
            chain: self.chain,
            ..base
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexEntry {
    pub chain_id: u64,
    pub router: String,
    pub slug: String,
}

fn default_api_base_url() -> String {
    "https://api-rs.dexcelerate.com".to_string()
}

fn default_ws_url() -> String {
    "wss://api-rs.dexcelerate.com/ws".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/scanner.log".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_overscan() -> usize {
    5
}

fn default_end_reached_threshold() -> usize {
    10
}

fn default_tables() -> Vec<TableConfig> {
    vec![
        TableConfig {
            title: "Trending Tokens".to_string(),
            preset: TablePreset::Trending,
            chain: None,
        },
        TableConfig {
            title: "New Tokens".to_string(),
            preset: TablePreset::New,
            chain: None,
        },
    ]
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            ws_url: default_ws_url(),
            log_level: default_log_level(),
            log_file: default_log_file(),
            request_timeout_secs: default_request_timeout(),
            reconnect: ReconnectConfig::default(),
            heartbeat: None,
            viewport: ViewportConfig::default(),
            tables: default_tables(),
            dexes: Vec::new(),
        }
    }
}

impl ScannerConfig {
    /// Load configuration from YAML file
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: ScannerConfig = serde_yaml::from_str(&yaml_content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Override URLs from SCANNER_API_URL / SCANNER_WS_URL when set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SCANNER_API_URL") {
            info!("Overriding API URL from environment variable");
            self.api_base_url = url;
        }
        if let Ok(url) = std::env::var("SCANNER_WS_URL") {
            info!("Overriding websocket URL from environment variable");
            self.ws_url = url;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_base_url cannot be empty".to_string(),
            ));
        }

        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(
                "ws_url must start with ws:// or wss://".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.reconnect.initial_delay_ms == 0
            || self.reconnect.max_delay_ms < self.reconnect.initial_delay_ms
        {
            return Err(ConfigError::ValidationError(
                "reconnect delays must satisfy 0 < initial_delay_ms <= max_delay_ms".to_string(),
            ));
        }

        if let Some(ref heartbeat) = self.heartbeat {
            if heartbeat.interval_secs == 0 {
                return Err(ConfigError::ValidationError(
                    "heartbeat.interval_secs must be greater than 0".to_string(),
                ));
            }
        }

        if self.tables.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one table must be configured".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Websocket settings: URL, backoff and optional heartbeat
    pub fn socket_config(&self) -> SocketConfig {
        let backoff = ExponentialBackoff::new(
            self.reconnect.initial_delay(),
            self.reconnect.max_delay(),
            self.reconnect.max_attempts,
        );
        let config = SocketConfig::new(self.ws_url.clone()).with_reconnect(backoff);
        match self.heartbeat {
            Some(ref hb) => {
                config.with_heartbeat(Duration::from_secs(hb.interval_secs), hb.payload.clone())
            }
            None => config,
        }
    }

    /// Router registry with the built-in routers plus configured overrides
    pub fn dex_registry(&self) -> DexRegistry {
        let mut registry = DexRegistry::with_defaults();
        for entry in &self.dexes {
            registry.insert(entry.chain_id, &entry.router, &entry.slug);
        }
        registry
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  API URL: {}", self.api_base_url);
        info!("  WS URL: {}", self.ws_url);
        info!("  Log level: {}", self.log_level);
        info!(
            "  Reconnect: {}ms → {}ms, attempts: {}",
            self.reconnect.initial_delay_ms,
            self.reconnect.max_delay_ms,
            self.reconnect
                .max_attempts
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unlimited".to_string())
        );
        info!(
            "  Viewport: overscan {}, end threshold {}",
            self.viewport.overscan, self.viewport.end_reached_threshold
        );
        for table in &self.tables {
            info!(
                "  Table: {} ({:?}{})",
                table.title,
                table.preset,
                table.chain.map(|c| format!(", {}", c)).unwrap_or_default()
            );
        }
        if !self.dexes.is_empty() {
            info!("  DEX overrides: {}", self.dexes.len());
        }
    }
}

//! CLI utilities for binaries
//!
//! Handles configuration loading and environment variables
//! for all binary executables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use scanner::ScannerConfig;
use tracing::warn;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Scanner configuration (scanner_config.yaml)
    Scanner,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Scanner => "config/scanner_config.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::Scanner => "SCANNER_CONFIG_PATH",
            ConfigType::Custom(_) => "CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use dex_scanner::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Scanner);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Load the scanner config, falling back to defaults when the file is missing.
///
/// A file that exists but fails to parse or validate is an error.
pub fn load_config(config_type: ConfigType) -> Result<ScannerConfig> {
    let path = load_config_from_env(config_type);
    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        let mut config = ScannerConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        return Ok(config);
    }
    ScannerConfig::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

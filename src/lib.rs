//! DEX Scanner - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **scanner**: Sync layer, clients and dashboard (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use dex_scanner::bin_common::{load_config_from_env, ConfigType};
//! use dex_scanner::scanner::ScannerConfig;
//! ```

// Re-export workspace libraries for convenience
pub use scanner;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config, load_config_from_env, parse_args, ConfigType};
    pub use runner::{BinaryRunner, RunConfig};
}

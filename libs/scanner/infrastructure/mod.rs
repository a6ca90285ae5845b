//! Infrastructure Layer
//!
//! Configuration, logging, shutdown, and the REST/websocket clients.
//! Depends on the domain layer but not on the application layer.

pub mod client;
pub mod config;
pub mod logging;
pub mod shutdown;

pub use client::{
    ClientEvent, ConnectionState, ExponentialBackoff, MessageHandler, ScannerApiClient,
    ScannerApiError, ScannerMessage, ScannerRoute, ScannerRouter, ScannerSocket, ScannerSource,
    SocketConfig, SocketError, SocketSender,
};
pub use config::{ConfigError, ScannerConfig, TableConfig, TablePreset};
pub use logging::{init_file_tracing, init_tracing};
pub use shutdown::ShutdownManager;

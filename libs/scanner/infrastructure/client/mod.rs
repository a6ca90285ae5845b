//! Scanner API clients
//!
//! REST for paginated result pages, websocket for live updates.

pub mod rest;
pub mod ws;

pub use rest::{ScannerApiClient, ScannerApiError, ScannerSource};
pub use ws::{
    ClientEvent, ConnectionState, ExponentialBackoff, MessageHandler, ReconnectionStrategy,
    ScannerMessage, ScannerRoute, ScannerRouter, ScannerSocket, SocketConfig, SocketError,
    SocketSender,
};

//! DEX Scanner
//!
//! Live token scanner tables kept in sync over a websocket, with paginated
//! REST loading and a virtualized terminal view.
//!
//! ## Layers
//!
//! - **domain**: wire DTOs, filters, rows and their merge rules, formatting
//! - **infrastructure**: config, logging, shutdown, REST and websocket clients
//! - **application**: the sync layer and the dashboard

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used items
pub use application::{
    BoardHandler, BoardUpdate, LoadStatus, OutgoingSink, PageLoader, ScannerBoard, ScannerTable,
    SharedBoard, TableId, Viewport,
};
pub use domain::{
    IncomingMessage, OutgoingMessage, ScannerFilter, ScannerResult, ScannerTableRow,
    SupportedChainName,
};
pub use infrastructure::{
    init_file_tracing, init_tracing, ClientEvent, ScannerApiClient, ScannerConfig, ScannerRouter,
    ScannerSocket, ShutdownManager, SocketConfig,
};

//! Scanner websocket client
//!
//! ```text
//! ScannerSocket (tokio task)
//!   ├─ connect / backoff / replay SubscriptionRegistry
//!   ├─ heartbeat (optional)
//!   └─ frames → ScannerRouter → handler threads (one per route)
//! ```

pub mod reconnect;
pub mod registry;
pub mod router;
pub mod socket;
pub mod state;

pub use reconnect::{ExponentialBackoff, ReconnectionStrategy};
pub use registry::SubscriptionRegistry;
pub use router::{MessageHandler, ScannerMessage, ScannerRoute, ScannerRouter};
pub use socket::{ClientEvent, ScannerSocket, SocketConfig, SocketError, SocketSender};
pub use state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};

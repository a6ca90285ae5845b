//! Real-time synchronization layer
//!
//! Scanner tables, the shared board that routes websocket messages to them,
//! viewport virtualization and reference-counted pair subscriptions.

pub mod board;
pub mod handlers;
pub mod loader;
pub mod subscriptions;
pub mod table;
pub mod viewport;

pub use board::{ScannerBoard, SharedBoard, TableId};
pub use handlers::{BoardHandler, BoardUpdate, OutgoingSink};
pub use loader::PageLoader;
pub use subscriptions::PairSubscriptions;
pub use table::{
    LoadStatus, MountDiff, PageRequest, ScannerTable, SortColumn, SortDirection, SortState,
};
pub use viewport::Viewport;

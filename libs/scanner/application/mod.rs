//! Application Layer
//!
//! The sync layer that keeps scanner tables current, and the dashboard that
//! shows them. Depends on domain and infrastructure layers.

pub mod dashboard;
pub mod sync;

pub use dashboard::App;
pub use sync::{
    BoardHandler, BoardUpdate, LoadStatus, OutgoingSink, PageLoader, ScannerBoard, ScannerTable,
    SharedBoard, TableId, Viewport,
};

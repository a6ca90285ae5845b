//! Scanner dashboard
//!
//! Terminal UI over the shared board. Rows are merged by the sync layer; the
//! UI only reads them and reports viewport changes.

pub mod app;
pub mod columns;
pub mod ui;

pub use app::App;

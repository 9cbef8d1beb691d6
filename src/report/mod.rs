//! Run reports.
//!
//! - [`ExecutionReport`] - Aggregate of a run's step results
//! - [`ReportGenerator`] - Plain-text and JSON rendering, persistence

pub mod execution;
pub mod render;

pub use execution::{ExecutionReport, OverallStatus};
pub use render::{ReportGenerator, REPORT_PREFIX};

//! HTML benchmark report: box plots of the per-fold metrics and a summary table.
pub mod plots;
#[allow(clippy::module_inception)]
pub mod report;

pub use report::{write_report, Report, ReportSection};

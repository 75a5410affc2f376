//! IO utilities for loading omics tables and writing per-fold results.

pub mod omics_csv;
pub mod results;

pub use omics_csv::{read_feature_table, read_label_table, TableFormat};
pub use results::write_fold_results;

//! Per-fold result tables.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::stats::FoldResult;

/// Write fold results as `run,acc,f1,roc_auc`, creating parent directories.
pub fn write_fold_results<P: AsRef<Path>>(path: P, results: &[FoldResult]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create results file: {}", path.display()))?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    log::info!("Wrote {} fold results to {}", results.len(), path.display());
    Ok(())
}

use anyhow::Result;
use std::path::PathBuf;

/// Check that `path` exists and names a CSV/TSV table, optionally gzipped.
pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let lower = path.to_lowercase();
    let table = lower.strip_suffix(".gz").unwrap_or(&lower);
    if !(table.ends_with(".tsv") || table.ends_with(".csv") || table.ends_with(".txt")) {
        anyhow::bail!("File must have a .tsv or .csv extension (optionally .gz): {}", path);
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

//! Delimited (optionally gzipped) table readers.
//!
//! Both tables are "index-first": the first column holds the sample
//! identifier, as written by `DataFrame.to_csv` with the default index.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use ndarray::Array2;

use crate::data_handling::{FeatureTable, LabelTable};

/// Supported file layouts, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    GzippedCsv,
    GzippedTsv,
}

impl TableFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match (ext.as_deref(), stem.as_deref()) {
            (Some("gz"), Some(stem)) if stem.ends_with(".csv") => Ok(TableFormat::GzippedCsv),
            (Some("gz"), Some(stem)) if stem.ends_with(".tsv") || stem.ends_with(".txt") => {
                Ok(TableFormat::GzippedTsv)
            }
            (Some("csv"), _) => Ok(TableFormat::Csv),
            (Some("tsv"), _) | (Some("txt"), _) => Ok(TableFormat::Tsv),
            _ => bail!("Unsupported table format: {}", path.display()),
        }
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            TableFormat::Csv | TableFormat::GzippedCsv => b',',
            TableFormat::Tsv | TableFormat::GzippedTsv => b'\t',
        }
    }

    pub fn is_gzipped(&self) -> bool {
        matches!(self, TableFormat::GzippedCsv | TableFormat::GzippedTsv)
    }
}

fn open_table<P: AsRef<Path>>(path: P) -> Result<csv::Reader<Box<dyn Read>>> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    let file = File::open(path).with_context(|| format!("Failed to open table: {}", path.display()))?;
    let inner: Box<dyn Read> = if format.is_gzipped() {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(csv::ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(true)
        .from_reader(inner))
}

/// Parse a numeric cell; empty and NA-like cells become NaN.
fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw {
        "" | "NA" | "NaN" | "nan" | "NULL" | "null" => Some(f64::NAN),
        _ => raw.parse::<f64>().ok(),
    }
}

/// Read a samples x features matrix. The header names the feature columns.
pub fn read_feature_table<P: AsRef<Path>>(path: P) -> Result<FeatureTable> {
    let path = path.as_ref();
    let mut reader = open_table(path)?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .clone();
    if headers.len() < 2 {
        bail!("Feature table {} has no feature columns", path.display());
    }
    let feature_names: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();
    let n_features = feature_names.len();

    let mut sample_ids = Vec::new();
    let mut values = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {} of {}", row_idx + 1, path.display()))?;
        if record.len() != n_features + 1 {
            bail!(
                "Row {} of {} has {} fields, expected {}",
                row_idx + 1,
                path.display(),
                record.len(),
                n_features + 1
            );
        }
        sample_ids.push(record[0].to_string());
        for (col, raw) in record.iter().skip(1).enumerate() {
            let v = parse_value(raw).ok_or_else(|| {
                anyhow!(
                    "Invalid numeric value '{}' at row {}, column '{}'",
                    raw,
                    row_idx + 1,
                    feature_names[col]
                )
            })?;
            values.push(v);
        }
    }

    let x = Array2::from_shape_vec((sample_ids.len(), n_features), values)
        .context("Feature table shape mismatch")?;
    log::debug!(
        "Read {} samples x {} features from {}",
        sample_ids.len(),
        n_features,
        path.display()
    );
    FeatureTable::new(sample_ids, feature_names, x)
}

/// Read a label table: sample id in the first column, label in the second.
pub fn read_label_table<P: AsRef<Path>>(path: P) -> Result<LabelTable> {
    let path = path.as_ref();
    let mut reader = open_table(path)?;
    let n_columns = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .len();
    if n_columns < 2 {
        bail!("Label table {} needs a sample id and a label column", path.display());
    }

    let mut sample_ids = Vec::new();
    let mut labels = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {} of {}", row_idx + 1, path.display()))?;
        let id = record
            .get(0)
            .ok_or_else(|| anyhow!("Missing sample id at row {}", row_idx + 1))?;
        let label = record
            .get(1)
            .ok_or_else(|| anyhow!("Missing label at row {}", row_idx + 1))?;
        sample_ids.push(id.to_string());
        labels.push(label.to_string());
    }
    LabelTable::new(sample_ids, labels)
}

//! In-memory feature and label tables.
//!
//! `FeatureTable` holds a samples x features matrix with its row and column
//! names, `LabelTable` the subtype label of each sample. An `Experiment` is
//! the label-joined view of a subset of rows that a classifier is fit or
//! evaluated on.
use std::collections::{BTreeSet, HashMap};

use anyhow::{ensure, Result};
use ndarray::{Array2, Axis};

/// Data types selected when no explicit list is given.
pub const DEFAULT_DATA_TYPES: [&str; 3] = ["mutation", "cnv", "rna"];

/// Token marking an already dimensionality-reduced representation.
pub const DIMENSIONALITY_REDUCTION: &str = "DR";

#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub sample_ids: Vec<String>,
    pub feature_names: Vec<String>,
    pub x: Array2<f64>,
}

/// Column selection by data-type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTypeFilter {
    /// Keep every column (latent factors have no data-type token)
    DimensionalityReduction,
    Types(Vec<String>),
}

impl Default for DataTypeFilter {
    fn default() -> Self {
        DataTypeFilter::Types(DEFAULT_DATA_TYPES.iter().map(|s| s.to_string()).collect())
    }
}

impl DataTypeFilter {
    /// Interpret a data-type list. A first token of `DR` disables filtering.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        match tokens.first() {
            Some(first) if first.as_ref() == DIMENSIONALITY_REDUCTION => {
                DataTypeFilter::DimensionalityReduction
            }
            _ => DataTypeFilter::Types(tokens.iter().map(|t| t.as_ref().to_string()).collect()),
        }
    }

    pub fn matches(&self, column: &str) -> bool {
        match self {
            DataTypeFilter::DimensionalityReduction => true,
            DataTypeFilter::Types(types) => column_matches_data_types(column, types),
        }
    }
}

/// True when the first or second `_`-separated token of `column` is one of `types`.
pub fn column_matches_data_types<S: AsRef<str>>(column: &str, types: &[S]) -> bool {
    let mut tokens = column.split('_');
    let prefix = tokens.next();
    let suffix = tokens.next();
    types.iter().any(|t| {
        let t = t.as_ref();
        prefix == Some(t) || suffix == Some(t)
    })
}

/// Gene symbol of a feature column (`TP53_mutation` -> `TP53`).
pub fn gene_of(column: &str) -> &str {
    column.split('_').next().unwrap_or(column)
}

impl FeatureTable {
    pub fn new(sample_ids: Vec<String>, feature_names: Vec<String>, x: Array2<f64>) -> Result<Self> {
        ensure!(
            x.nrows() == sample_ids.len(),
            "Feature matrix has {} rows but {} sample ids were given",
            x.nrows(),
            sample_ids.len()
        );
        ensure!(
            x.ncols() == feature_names.len(),
            "Feature matrix has {} columns but {} feature names were given",
            x.ncols(),
            feature_names.len()
        );
        Ok(FeatureTable {
            sample_ids,
            feature_names,
            x,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn log_input_data_summary(&self) {
        log::info!(
            "Feature table: {} samples x {} features",
            self.n_samples(),
            self.n_features()
        );
    }

    pub fn select_columns(&self, columns: &[usize]) -> FeatureTable {
        FeatureTable {
            sample_ids: self.sample_ids.clone(),
            feature_names: columns.iter().map(|&c| self.feature_names[c].clone()).collect(),
            x: self.x.select(Axis(1), columns),
        }
    }

    /// Keep the columns accepted by `filter`, in their original order.
    pub fn filter_data_types(&self, filter: &DataTypeFilter) -> FeatureTable {
        if *filter == DataTypeFilter::DimensionalityReduction {
            return self.clone();
        }
        let keep: Vec<usize> = self
            .feature_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| if filter.matches(name) { Some(i) } else { None })
            .collect();
        log::debug!(
            "Data-type filter {:?} kept {} of {} columns",
            filter,
            keep.len(),
            self.n_features()
        );
        self.select_columns(&keep)
    }

    /// Replace NaN entries with `value`, returning how many were replaced.
    pub fn fill_nan(&mut self, value: f64) -> usize {
        let mut replaced = 0;
        self.x.mapv_inplace(|v| {
            if v.is_nan() {
                replaced += 1;
                value
            } else {
                v
            }
        });
        replaced
    }

    /// Unique gene symbols of the feature columns, excluding the `tissue` pseudo-gene.
    pub fn genes(&self) -> BTreeSet<String> {
        self.feature_names
            .iter()
            .map(|name| gene_of(name))
            .filter(|gene| *gene != "tissue")
            .map(|gene| gene.to_string())
            .collect()
    }

    /// Keep the columns whose gene symbol belongs to `genes`.
    pub fn restrict_to_genes(&self, genes: &BTreeSet<String>) -> FeatureTable {
        let keep: Vec<usize> = self
            .feature_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| if genes.contains(gene_of(name)) { Some(i) } else { None })
            .collect();
        self.select_columns(&keep)
    }
}

#[derive(Debug, Clone)]
pub struct LabelTable {
    pub sample_ids: Vec<String>,
    pub labels: Vec<String>,
}

impl LabelTable {
    pub fn new(sample_ids: Vec<String>, labels: Vec<String>) -> Result<Self> {
        ensure!(
            sample_ids.len() == labels.len(),
            "{} sample ids but {} labels",
            sample_ids.len(),
            labels.len()
        );
        Ok(LabelTable { sample_ids, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sorted class names and their ids.
    pub fn encoding(&self) -> ClassEncoding {
        ClassEncoding::new(self.labels.iter().cloned())
    }

    /// Sample id -> class id. When a sample is listed twice the last label wins.
    pub fn class_ids(&self, encoding: &ClassEncoding) -> HashMap<&str, usize> {
        self.sample_ids
            .iter()
            .zip(self.labels.iter())
            .filter_map(|(id, label)| encoding.class_to_id(label).map(|c| (id.as_str(), c)))
            .collect()
    }
}

/// Bidirectional mapping between class names and contiguous ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEncoding {
    classes: Vec<String>,
}

impl ClassEncoding {
    pub fn new<I: IntoIterator<Item = String>>(labels: I) -> Self {
        let classes: BTreeSet<String> = labels.into_iter().collect();
        ClassEncoding {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_to_id(&self, name: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(name)).ok()
    }

    pub fn id_to_class(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(|s| s.as_str())
    }
}

/// Labelled rows of a feature table, ready for fitting or evaluation.
#[derive(Debug, Clone)]
pub struct Experiment {
    pub x: Array2<f64>,
    pub y: Vec<usize>,
}

impl Experiment {
    /// Inner-join the given rows of `table` with the label lookup.
    ///
    /// Rows are taken in ascending table order; rows without a label are dropped.
    pub fn join(table: &FeatureTable, rows: &[usize], class_ids: &HashMap<&str, usize>) -> Experiment {
        let mut rows = rows.to_vec();
        rows.sort_unstable();

        let mut kept = Vec::with_capacity(rows.len());
        let mut y = Vec::with_capacity(rows.len());
        for &row in &rows {
            if let Some(&class) = class_ids.get(table.sample_ids[row].as_str()) {
                kept.push(row);
                y.push(class);
            }
        }
        if kept.len() < rows.len() {
            log::trace!("Dropped {} unlabelled samples", rows.len() - kept.len());
        }

        Experiment {
            x: table.x.select(Axis(0), &kept),
            y,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.y.len()
    }
}

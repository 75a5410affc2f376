//! Pathway-to-gene mappings restricted to the genes of a feature table.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One row of the pathway table; other columns are ignored.
#[derive(Debug, Deserialize)]
struct PathwayRow {
    name: String,
    genes: String,
}

/// Pathway name to the member genes that also appear in the feature table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathwayGeneSets {
    pub pathways: BTreeMap<String, Vec<String>>,
}

impl PathwayGeneSets {
    /// Build from `(name, genes)` pairs, keeping only genes in `known_genes`.
    /// Pathways left without genes are dropped.
    pub fn from_pairs<I>(pairs: I, known_genes: &BTreeSet<String>) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut pathways = BTreeMap::new();
        for (name, genes) in pairs {
            let kept: Vec<String> = genes
                .into_iter()
                .filter(|g| known_genes.contains(g))
                .collect();
            if kept.is_empty() {
                log::trace!("Dropping pathway {} with no measured genes", name);
                continue;
            }
            pathways.insert(name, kept);
        }
        PathwayGeneSets { pathways }
    }

    pub fn len(&self) -> usize {
        self.pathways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
    }

    pub fn get(&self, pathway: &str) -> Option<&[String]> {
        self.pathways.get(pathway).map(|g| g.as_slice())
    }

    /// Union of the genes of all pathways.
    pub fn cancer_genes(&self) -> BTreeSet<String> {
        self.pathways.values().flatten().cloned().collect()
    }

    /// Genes of `all_genes` that belong to no pathway.
    pub fn non_cancer_genes(&self, all_genes: &BTreeSet<String>) -> BTreeSet<String> {
        let cancer = self.cancer_genes();
        all_genes.difference(&cancer).cloned().collect()
    }
}

/// Read a pathway CSV with `name` and `genes` columns (`|`-separated symbols).
pub fn read_pathways<P: AsRef<Path>>(path: P, known_genes: &BTreeSet<String>) -> Result<PathwayGeneSets> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open pathway table: {}", path.display()))?;

    let mut pairs = Vec::new();
    for row in reader.deserialize() {
        let row: PathwayRow = row.with_context(|| format!("Malformed row in {}", path.display()))?;
        let genes = row
            .genes
            .split('|')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        pairs.push((row.name, genes));
    }

    let sets = PathwayGeneSets::from_pairs(pairs, known_genes);
    log::info!(
        "Loaded {} pathways covering {} measured genes from {}",
        sets.len(),
        sets.cancer_genes().len(),
        path.display()
    );
    Ok(sets)
}

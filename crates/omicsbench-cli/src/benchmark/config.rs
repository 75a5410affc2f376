use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use omicsbench_classifiers::config::CvConfig;
use omicsbench_classifiers::data_handling::DEFAULT_DATA_TYPES;

/// Which genes a run's feature table is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneSet {
    #[default]
    All,
    /// Genes that belong to at least one pathway of the pathway table
    Cancer,
}

/// One `run_model` invocation and where its fold results go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    /// Label used in logs and the report; derived from the output file when absent
    #[serde(default)]
    pub name: Option<String>,
    pub classifier: String,
    pub features: String,
    #[serde(default = "default_data_types")]
    pub data_types: Vec<String>,
    #[serde(default)]
    pub gene_set: GeneSet,
    pub output: String,
}

fn default_data_types() -> Vec<String> {
    DEFAULT_DATA_TYPES.iter().map(|s| s.to_string()).collect()
}

impl RunSpec {
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        Path::new(&self.output)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.classifier.clone())
    }
}

/// Parameters for a full benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub labels: String,
    /// Pathway table (`name`, `genes`); required by runs using the cancer gene set
    pub pathways: Option<String>,
    pub cv: CvConfig,
    /// Optional HTML report summarizing every run
    pub report: Option<String>,
    pub runs: Vec<RunSpec>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let dr_rf = |features: &str, output: &str| RunSpec {
            name: None,
            classifier: "RF".to_string(),
            features: features.to_string(),
            data_types: vec!["DR".to_string()],
            gene_set: GeneSet::All,
            output: output.to_string(),
        };
        Self {
            labels: "data/processed/cancer_type/tcga_brca_mutation_cnv_rna_subtypes.csv".to_string(),
            pathways: None,
            cv: CvConfig::default(),
            report: None,
            runs: vec![
                dr_rf(
                    "data/DR/MOVE/tcga_brca_mutation_cnv_rna_200factor.csv",
                    "results/tcga_brca_subtype/MOVE_rf_mutation_cnv_rna_allgenes.csv",
                ),
                dr_rf(
                    "data/DR/scVAEIT/tcga_brca_scvaeit_latent_200factor.csv",
                    "results/tcga_brca_subtype/scVAEIT_rf_mutation_cnv_rna_allgenes.csv",
                ),
            ],
        }
    }
}

/// Load a benchmark configuration from a JSON file.
pub fn load_benchmark_config<P: AsRef<Path>>(path: P) -> Result<BenchmarkConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: BenchmarkConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, Result};

use omicsbench_classifiers::config::ModelType;
use omicsbench_classifiers::cross_validation::run_model;
use omicsbench_classifiers::data_handling::FeatureTable;
use omicsbench_classifiers::io::{read_feature_table, read_label_table, write_fold_results};
use omicsbench_classifiers::pathways::read_pathways;
use omicsbench_classifiers::report::write_report;
use omicsbench_classifiers::stats::FoldResult;

use crate::benchmark::config::{BenchmarkConfig, GeneSet, RunSpec};
use crate::util::validate_tsv_or_csv_file;

/// Fold results of one run, keyed by its display name.
pub type NamedRun = (String, Vec<FoldResult>);

/// Fail before any run starts when a run names an unknown classifier or a
/// missing input.
pub fn validate_config(config: &BenchmarkConfig) -> Result<()> {
    validate_tsv_or_csv_file(&config.labels)?;
    for run in &config.runs {
        ModelType::from_str(&run.classifier)
            .with_context(|| format!("Invalid classifier in run {}", run.display_name()))?;
        validate_tsv_or_csv_file(&run.features)?;
        if run.gene_set == GeneSet::Cancer {
            let pathways = config.pathways.as_deref().with_context(|| {
                format!(
                    "Run {} uses the cancer gene set but no pathway table is configured",
                    run.display_name()
                )
            })?;
            validate_tsv_or_csv_file(pathways)?;
        }
    }
    Ok(())
}

/// Load a feature table, replacing missing values with zero.
fn load_features(path: &str) -> Result<FeatureTable> {
    let mut table = read_feature_table(path)?;
    let filled = table.fill_nan(0.0);
    if filled > 0 {
        log::info!("Filled {} missing values with 0 in {}", filled, path);
    }
    table.log_input_data_summary();
    Ok(table)
}

fn prepare_features(run: &RunSpec, table: &FeatureTable, pathways: Option<&str>) -> Result<FeatureTable> {
    match run.gene_set {
        GeneSet::All => Ok(table.clone()),
        GeneSet::Cancer => {
            let path = pathways.context("The cancer gene set requires a pathway table")?;
            let sets = read_pathways(path, &table.genes())?;
            let restricted = table.restrict_to_genes(&sets.cancer_genes());
            log::info!(
                "Restricted {} to {} cancer-gene features",
                run.features,
                restricted.n_features()
            );
            Ok(restricted)
        }
    }
}

/// Run every configured benchmark in order, writing each results table as it completes.
pub fn run_benchmark(config: &BenchmarkConfig) -> Result<Vec<NamedRun>> {
    validate_config(config)?;

    let labels = read_label_table(&config.labels)?;
    log::info!(
        "Loaded {} labels ({} classes) from {}",
        labels.len(),
        labels.encoding().n_classes(),
        config.labels
    );

    let mut tables: HashMap<String, FeatureTable> = HashMap::new();
    let mut finished = Vec::with_capacity(config.runs.len());
    for run in &config.runs {
        let name = run.display_name();
        log::info!("Running {} ({} on {})", name, run.classifier, run.features);

        if !tables.contains_key(&run.features) {
            tables.insert(run.features.clone(), load_features(&run.features)?);
        }
        let table = &tables[&run.features];
        let features = prepare_features(run, table, config.pathways.as_deref())?;

        let results = run_model(&features, &labels, &run.classifier, run.data_types.as_slice(), &config.cv)
            .with_context(|| format!("Run {} failed", name))?;
        write_fold_results(&run.output, &results)?;
        finished.push((name, results));
    }

    if let Some(report) = &config.report {
        write_report(report, &finished)?;
    }
    Ok(finished)
}

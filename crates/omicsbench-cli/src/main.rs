use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use omicsbench_classifiers::config::ModelType;
use omicsbench_cli::benchmark::config::{load_benchmark_config, BenchmarkConfig, GeneSet, RunSpec};
use omicsbench_cli::benchmark::runner::run_benchmark;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("OMICSBENCH_LOG", "error,omicsbench=info"))
        .init();

    let matches = Command::new("omicsbench")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("\u{1F9EC} omicsbench - Cross-validated baselines for multi-omics cancer subtype classification")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run every classifier/representation combination of a benchmark config")
                .arg(
                    Arg::new("config")
                        .help("Path to benchmark JSON configuration file. Defaults are used when omitted.")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Write an HTML report to this path. Overrides the report in the configuration file.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("cv")
                .about("Cross-validate a single classifier on one feature table")
                .arg(
                    Arg::new("features")
                        .short('f')
                        .long("features")
                        .help("Feature table (samples x features, CSV/TSV, optionally gzipped)")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("labels")
                        .short('l')
                        .long("labels")
                        .help("Label table (sample id, subtype)")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("classifier")
                        .short('c')
                        .long("classifier")
                        .help("Classifier name: RF, XGB, LR, ridge, KNN, SVML, SVM, NB or DT")
                        .default_value("RF")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Path of the per-fold results CSV")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data_types")
                        .long("data-types")
                        .help("Comma-separated data types to keep (mutation,cnv,rna), or DR to keep every column")
                        .value_delimiter(',')
                        .num_args(1..)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("pathways")
                        .long("pathways")
                        .help("Pathway table with `name` and `genes` columns")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("cancer_genes")
                        .long("cancer-genes")
                        .help("Restrict features to genes found in the pathway table")
                        .requires("pathways")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("repeats")
                        .long("repeats")
                        .help("Number of repeated k-fold shuffles")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("folds")
                        .long("folds")
                        .help("Number of folds per repeat")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Base seed; repeat n shuffles with seed + n")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("scale")
                        .long("scale")
                        .help("Standardize features with training-split statistics")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("classifiers").about("List the available classifiers"))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("run", sub_m)) => handle_run(sub_m),
        Some(("cv", sub_m)) => handle_cv(sub_m),
        Some(("classifiers", _)) => {
            for name in ModelType::menu() {
                println!("{}", name);
            }
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let mut config = if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        log::info!("[omicsbench::run] Using config: {:?}", config_path);
        load_benchmark_config(config_path)?
    } else {
        log::info!("[omicsbench::run] No config provided; using defaults.");
        let config = BenchmarkConfig::default();
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[omicsbench::run] Default config:\n{}", default_json);
        config
    };

    if let Some(report) = matches.get_one::<String>("report") {
        config.report = Some(report.clone());
    }

    execute(&config)
}

fn handle_cv(matches: &ArgMatches) -> Result<()> {
    let mut config = BenchmarkConfig {
        labels: matches.get_one::<String>("labels").cloned().unwrap_or_default(),
        pathways: matches.get_one::<String>("pathways").cloned(),
        report: None,
        runs: Vec::new(),
        ..BenchmarkConfig::default()
    };

    if let Some(repeats) = matches.get_one::<usize>("repeats") {
        config.cv.num_repeat = *repeats;
    }
    if let Some(folds) = matches.get_one::<usize>("folds") {
        config.cv.num_fold = *folds;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.cv.seed = *seed;
    }
    config.cv.scale_features = matches.get_flag("scale");

    let data_types: Vec<String> = match matches.get_many::<String>("data_types") {
        Some(values) => values.cloned().collect(),
        None => omicsbench_classifiers::data_handling::DEFAULT_DATA_TYPES
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    config.runs.push(RunSpec {
        name: None,
        classifier: matches.get_one::<String>("classifier").cloned().unwrap_or_default(),
        features: matches.get_one::<String>("features").cloned().unwrap_or_default(),
        data_types,
        gene_set: if matches.get_flag("cancer_genes") {
            GeneSet::Cancer
        } else {
            GeneSet::All
        },
        output: matches.get_one::<String>("output").cloned().unwrap_or_default(),
    });

    execute(&config)
}

fn execute(config: &BenchmarkConfig) -> Result<()> {
    match run_benchmark(config) {
        Ok(runs) => {
            let n_folds: usize = runs.iter().map(|(_, results)| results.len()).sum();
            log::info!(
                "[omicsbench] Completed {} runs ({} folds).",
                runs.len(),
                n_folds
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Benchmark failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

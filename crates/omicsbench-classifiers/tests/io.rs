//! Integration tests for the table readers and the results writer.

use std::fs;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use omicsbench_classifiers::io::{read_feature_table, read_label_table, write_fold_results};
use omicsbench_classifiers::stats::FoldResult;

const OMICS_CSV: &str = "\
,TP53_mutation,TP53_rna,ERBB2_cnv
TCGA-A1,1,5.5,NA
TCGA-A2,0,,2
TCGA-A3,0,3.25,-1
";

#[test]
fn reads_plain_csv_with_missing_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("omics.csv");
    fs::write(&path, OMICS_CSV).unwrap();

    let table = read_feature_table(&path).unwrap();
    assert_eq!(table.sample_ids, vec!["TCGA-A1", "TCGA-A2", "TCGA-A3"]);
    assert_eq!(table.feature_names, vec!["TP53_mutation", "TP53_rna", "ERBB2_cnv"]);
    assert_eq!(table.x[(0, 1)], 5.5);
    assert!(table.x[(0, 2)].is_nan());
    assert!(table.x[(1, 1)].is_nan());
    assert_eq!(table.x[(2, 2)], -1.0);
}

#[test]
fn reads_gzipped_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("omics.csv.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(OMICS_CSV.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let table = read_feature_table(&path).unwrap();
    assert_eq!(table.n_samples(), 3);
    assert_eq!(table.n_features(), 3);
    assert_eq!(table.x[(2, 1)], 3.25);
}

#[test]
fn reads_tsv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("embedding.tsv");
    fs::write(&path, "sample\tfactor1\tfactor2\ns1\t0.1\t0.2\ns2\t0.3\t0.4\n").unwrap();

    let table = read_feature_table(&path).unwrap();
    assert_eq!(table.feature_names, vec!["factor1", "factor2"]);
    assert_eq!(table.x[(1, 0)], 0.3);
}

#[test]
fn rejects_ragged_rows_and_bad_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let ragged = dir.path().join("ragged.csv");
    fs::write(&ragged, ",a_rna,b_rna\ns1,1,2\ns2,1\n").unwrap();
    assert!(read_feature_table(&ragged).is_err());

    let bad = dir.path().join("bad.csv");
    fs::write(&bad, ",a_rna\ns1,high\n").unwrap();
    assert!(read_feature_table(&bad).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_feature_table(dir.path().join("absent.csv")).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.csv"));
}

#[test]
fn reads_label_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subtypes.csv");
    fs::write(&path, "Cell_line,subtype\nTCGA-A1,LumA\nTCGA-A2,Basal\nTCGA-A3,LumA\n").unwrap();

    let labels = read_label_table(&path).unwrap();
    assert_eq!(labels.len(), 3);
    let encoding = labels.encoding();
    assert_eq!(encoding.classes(), &["Basal".to_string(), "LumA".to_string()]);
    assert_eq!(labels.class_ids(&encoding)["TCGA-A1"], 1);
}

#[test]
fn fold_results_use_expected_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results").join("rf.csv");
    let results = vec![
        FoldResult {
            run: "cv_0".to_string(),
            acc: 0.75,
            f1: 0.5,
            roc_auc: 0.875,
        },
        FoldResult {
            run: "cv_1".to_string(),
            acc: 1.0,
            f1: 1.0,
            roc_auc: 1.0,
        },
    ];
    write_fold_results(&path, &results).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("run,acc,f1,roc_auc\n"));
    assert!(text.contains("cv_0,0.75,0.5,0.875"));
    assert!(text.contains("cv_1,1.0,1.0,1.0"));
    assert_eq!(text.lines().count(), 3);
}

//! Integration tests for pathway gene-set loading.

use std::collections::BTreeSet;
use std::fs;

use ndarray::Array2;
use omicsbench_classifiers::data_handling::FeatureTable;
use omicsbench_classifiers::pathways::read_pathways;

#[test]
fn pathways_are_restricted_to_measured_genes() {
    let columns = ["TP53_mutation", "TP53_rna", "ESR1_rna", "GATA3_cnv", "tissue_breast"];
    let table = FeatureTable::new(
        vec!["s1".to_string()],
        columns.iter().map(|c| c.to_string()).collect(),
        Array2::zeros((1, columns.len())),
    )
    .unwrap();
    let genes = table.genes();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pathways.csv");
    fs::write(
        &path,
        "name,genes,Cancer_Publications\n\
         p53 signalling,TP53|MDM2|CDKN1A,120\n\
         estrogen,ESR1|PGR,80\n\
         ras,KRAS|NRAS,300\n",
    )
    .unwrap();

    let sets = read_pathways(&path, &genes).unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets.get("estrogen").unwrap(), &["ESR1".to_string()]);
    assert!(sets.get("ras").is_none());

    let cancer = sets.cancer_genes();
    assert_eq!(cancer, ["ESR1", "TP53"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>());
    assert_eq!(
        sets.non_cancer_genes(&genes),
        ["GATA3"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()
    );

    let restricted = table.restrict_to_genes(&cancer);
    assert_eq!(restricted.feature_names, vec!["TP53_mutation", "TP53_rna", "ESR1_rna"]);
}

#[test]
fn missing_genes_column_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pathways.csv");
    fs::write(&path, "name,members\np53,TP53\n").unwrap();
    assert!(read_pathways(&path, &BTreeSet::new()).is_err());
}

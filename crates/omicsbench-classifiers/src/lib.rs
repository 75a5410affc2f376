//! omicsbench-classifiers: cross-validated baseline classifiers for cancer
//! subtype prediction from multi-omics tables.
//!
//! The crate loads feature and label tables, filters feature columns by
//! data type, and runs repeated k-fold cross-validation of a menu of
//! classifiers (random forest, gradient boosting, logistic regression,
//! ridge, k-nearest-neighbors, SVM, naive Bayes, decision tree), scoring each
//! fold by accuracy, macro F1 and one-vs-one ROC AUC.
//!
//! Logistic regression and SVM are backed by `linfa` and sit behind the
//! default `linfa` feature.
pub mod config;
pub mod cross_validation;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod models;
pub mod pathways;
pub mod preprocessing;
pub mod report;
pub mod stats;

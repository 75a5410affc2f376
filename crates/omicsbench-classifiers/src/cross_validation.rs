//! Repeated k-fold cross-validation of a single classifier.
use std::collections::BTreeSet;
use std::str::FromStr;

use anyhow::{bail, ensure, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tqdm::tqdm;

use crate::config::{CvConfig, ModelConfig, ModelType};
use crate::data_handling::{DataTypeFilter, Experiment, FeatureTable, LabelTable};
use crate::error::BenchmarkError;
use crate::models::build_model;
use crate::preprocessing::scale_split;
use crate::stats::{accuracy, f1_macro, roc_auc_ovo, summarize, FoldResult};

/// K-fold splitter over sample positions.
///
/// The first `n_samples % n_splits` folds hold one extra sample.
#[derive(Debug, Clone)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize, shuffle: bool, seed: u64) -> Self {
        KFold {
            n_splits,
            shuffle,
            seed,
        }
    }

    /// `(train, validation)` row positions of every fold, each sorted ascending.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        ensure!(
            self.n_splits >= 2,
            "k-fold cross-validation needs at least 2 folds, got {}",
            self.n_splits
        );
        ensure!(
            self.n_splits <= n_samples,
            "Cannot split {} samples into {} folds",
            n_samples,
            self.n_splits
        );

        let mut order: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            order.shuffle(&mut rng);
        }

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            let stop = start + size;

            let mut validation = order[start..stop].to_vec();
            validation.sort_unstable();
            let mut train: Vec<usize> = order[..start].iter().chain(&order[stop..]).copied().collect();
            train.sort_unstable();

            folds.push((train, validation));
            start = stop;
        }
        Ok(folds)
    }
}

/// Cross-validate the menu classifier `clf_name` with its default hyper-parameters.
///
/// `data_types` selects feature columns by data-type token; a first token of
/// `DR` keeps every column. The classifier name is resolved before any fold
/// runs, so an unknown name yields no results.
pub fn run_model<S: AsRef<str>>(
    features: &FeatureTable,
    labels: &LabelTable,
    clf_name: &str,
    data_types: &[S],
    cv: &CvConfig,
) -> Result<Vec<FoldResult>> {
    let model_type = ModelType::from_str(clf_name)?;
    let params = ModelConfig::new(cv.seed, model_type);
    let filter = DataTypeFilter::from_tokens(data_types);
    run_model_with_config(features, labels, &params, &filter, cv)
}

/// Cross-validate an explicit model configuration.
pub fn run_model_with_config(
    features: &FeatureTable,
    labels: &LabelTable,
    params: &ModelConfig,
    filter: &DataTypeFilter,
    cv: &CvConfig,
) -> Result<Vec<FoldResult>> {
    let table = features.filter_data_types(filter);
    if table.n_features() == 0 {
        bail!(
            "No feature columns left after selecting data types {:?}",
            filter
        );
    }

    let encoding = labels.encoding();
    let class_ids = labels.class_ids(&encoding);
    let n_classes = encoding.n_classes();
    let clf_name = params.model_type.menu_name();

    log::info!(
        "Cross-validating {} on {} samples x {} features, {} classes ({} repeats x {} folds)",
        clf_name,
        table.n_samples(),
        table.n_features(),
        n_classes,
        cv.num_repeat,
        cv.num_fold
    );

    let mut results = Vec::with_capacity(cv.num_repeat * cv.num_fold);
    let mut count = 0usize;
    for repeat in 0..cv.num_repeat {
        let folds = KFold::new(cv.num_fold, true, cv.seed.wrapping_add(repeat as u64)).split(table.n_samples())?;

        let progress = tqdm(folds.into_iter()).desc(Some(format!("{} repeat {}", clf_name, repeat)));
        for (train_rows, val_rows) in progress {
            let train = Experiment::join(&table, &train_rows, &class_ids);
            let validation = Experiment::join(&table, &val_rows, &class_ids);
            if train.n_samples() == 0 {
                return Err(BenchmarkError::EmptySplit {
                    fold: count,
                    split: "training",
                }
                .into());
            }
            if validation.n_samples() == 0 {
                return Err(BenchmarkError::EmptySplit {
                    fold: count,
                    split: "validation",
                }
                .into());
            }

            for class in missing_from_training(&train.y, &validation.y) {
                log::warn!(
                    "cv_{}: class {} is in the validation split but not in training",
                    count,
                    encoding.id_to_class(class).unwrap_or("?")
                );
            }

            let (train_x, val_x) = if cv.scale_features {
                scale_split(&train.x, &validation.x)?
            } else {
                (train.x, validation.x)
            };

            let mut model = build_model(params);
            model.fit(&train_x, &train.y, n_classes)?;
            let y_pred = model.predict(&val_x)?;
            let y_conf = model.predict_proba(&val_x)?;
            if y_pred.len() != validation.y.len() {
                return Err(BenchmarkError::LengthMismatch {
                    expected: validation.y.len(),
                    found: y_pred.len(),
                }
                .into());
            }

            let result = FoldResult {
                run: format!("cv_{}", count),
                acc: accuracy(&validation.y, &y_pred),
                f1: f1_macro(&validation.y, &y_pred),
                roc_auc: roc_auc_ovo(&validation.y, &y_conf),
            };
            log::debug!(
                "{}: acc = {:.4}, f1 = {:.4}, roc_auc = {:.4} ({} train / {} validation)",
                result.run,
                result.acc,
                result.f1,
                result.roc_auc,
                train.y.len(),
                validation.y.len()
            );
            results.push(result);
            count += 1;
        }
    }

    let summary = summarize(&results);
    log::info!(
        "{}: acc {:.4} ± {:.4}, f1 {:.4} ± {:.4}, roc_auc {:.4} ± {:.4}",
        clf_name,
        summary.acc_mean,
        summary.acc_std,
        summary.f1_mean,
        summary.f1_std,
        summary.roc_auc_mean,
        summary.roc_auc_std
    );
    Ok(results)
}

/// Class ids present in `validation` but never seen in `train`, ascending.
fn missing_from_training(train: &[usize], validation: &[usize]) -> Vec<usize> {
    let seen: BTreeSet<usize> = train.iter().copied().collect();
    validation
        .iter()
        .copied()
        .filter(|c| !seen.contains(c))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_sizes_follow_kfold_rule() {
        let folds = KFold::new(3, true, 1).split(10).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|(_, v)| v.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        for (train, validation) in &folds {
            assert_eq!(train.len() + validation.len(), 10);
        }
    }

    #[test]
    fn unshuffled_folds_are_contiguous() {
        let folds = KFold::new(2, false, 0).split(4).unwrap();
        assert_eq!(folds[0], (vec![2, 3], vec![0, 1]));
        assert_eq!(folds[1], (vec![0, 1], vec![2, 3]));
    }

    #[test]
    fn invalid_fold_counts_error() {
        assert!(KFold::new(1, true, 0).split(10).is_err());
        assert!(KFold::new(5, true, 0).split(3).is_err());
    }

    #[test]
    fn seed_near_max_wraps_between_repeats() {
        let (features, labels) = (
            FeatureTable::new(
                (0..6).map(|i| format!("s{}", i)).collect(),
                vec!["g_rna".to_string()],
                ndarray::Array2::from_shape_fn((6, 1), |(i, _)| (i % 2) as f64),
            )
            .unwrap(),
            LabelTable::new(
                (0..6).map(|i| format!("s{}", i)).collect(),
                (0..6).map(|i| if i % 2 == 0 { "A" } else { "B" }.to_string()).collect(),
            )
            .unwrap(),
        );
        let cv = CvConfig {
            num_repeat: 2,
            num_fold: 2,
            seed: u64::MAX,
            scale_features: false,
        };
        let results = run_model(&features, &labels, "DT", &["rna"], &cv).unwrap();
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn classes_missing_from_training_are_listed_once() {
        assert_eq!(missing_from_training(&[0, 0, 1], &[2, 1, 2, 3]), vec![2, 3]);
        assert!(missing_from_training(&[0, 1], &[1, 0]).is_empty());
    }
}

use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Metrics of one cross-validation fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    pub run: String,
    pub acc: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

/// Mean and sample standard deviation of each metric over a set of folds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub n_folds: usize,
    pub acc_mean: f64,
    pub acc_std: f64,
    pub f1_mean: f64,
    pub f1_std: f64,
    pub roc_auc_mean: f64,
    pub roc_auc_std: f64,
}

/// Fraction of predictions equal to the true label.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "y_true and y_pred must have equal lengths");
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Unweighted mean of per-class F1 over every label seen in `y_true` or `y_pred`.
///
/// A class with no true positives scores 0.
pub fn f1_macro(y_true: &[usize], y_pred: &[usize]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "y_true and y_pred must have equal lengths");
    let labels: BTreeSet<usize> = y_true.iter().chain(y_pred.iter()).copied().collect();
    if labels.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    for &label in &labels {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == label, p == label) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }
        let denom = 2 * tp + fp + fn_;
        if denom > 0 {
            total += 2.0 * tp as f64 / denom as f64;
        }
    }
    total / labels.len() as f64
}

/// Area under the ROC curve of `scores` for the positive samples in `is_positive`.
///
/// Computed as the Mann-Whitney statistic with ties counting one half.
/// Returns 0.5 when either class is absent.
pub fn binary_auc(scores: ArrayView1<f64>, is_positive: &[bool]) -> f64 {
    assert_eq!(scores.len(), is_positive.len(), "scores and labels must have equal lengths");

    let mut combined: Vec<(f64, bool)> = scores.iter().copied().zip(is_positive.iter().copied()).collect();
    combined.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total_pos = combined.iter().filter(|(_, p)| *p).count() as f64;
    let total_neg = combined.len() as f64 - total_pos;
    if total_pos == 0.0 || total_neg == 0.0 {
        return 0.5;
    }

    // Sum of positive ranks, averaging ranks within tied groups
    let mut rank_sum = 0.0;
    let mut start = 0;
    while start < combined.len() {
        let mut end = start + 1;
        while end < combined.len() && combined[end].0 == combined[start].0 {
            end += 1;
        }
        let avg_rank = (start + end + 1) as f64 / 2.0;
        let positives = combined[start..end].iter().filter(|(_, p)| *p).count() as f64;
        rank_sum += avg_rank * positives;
        start = end;
    }

    (rank_sum - total_pos * (total_pos + 1.0) / 2.0) / (total_pos * total_neg)
}

/// Macro one-vs-one multiclass AUC (Hand & Till).
///
/// `proba` has one column per class id. Only classes present in `y_true` are
/// compared; with exactly two present classes this is the binary AUC of the
/// greater class. Fewer than two classes leaves the AUC undefined and 0.5 is
/// returned.
pub fn roc_auc_ovo(y_true: &[usize], proba: &Array2<f64>) -> f64 {
    assert_eq!(y_true.len(), proba.nrows(), "y_true and proba must have equal lengths");
    let present: Vec<usize> = y_true.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    assert!(
        present.iter().all(|&c| c < proba.ncols()),
        "class id out of range for probability matrix"
    );

    match present.len() {
        0 | 1 => {
            log::warn!(
                "Only {} class present in validation labels; ROC AUC is undefined, reporting 0.5",
                present.len()
            );
            0.5
        }
        2 => {
            let positive = present[1];
            let is_positive: Vec<bool> = y_true.iter().map(|&c| c == positive).collect();
            binary_auc(proba.column(positive), &is_positive)
        }
        _ => {
            let mut total = 0.0;
            let mut n_pairs = 0usize;
            for (i, &a) in present.iter().enumerate() {
                for &b in &present[i + 1..] {
                    let rows: Vec<usize> = (0..y_true.len())
                        .filter(|&r| y_true[r] == a || y_true[r] == b)
                        .collect();
                    let is_a: Vec<bool> = rows.iter().map(|&r| y_true[r] == a).collect();
                    let is_b: Vec<bool> = is_a.iter().map(|v| !v).collect();
                    let scores_a: Vec<f64> = rows.iter().map(|&r| proba[(r, a)]).collect();
                    let scores_b: Vec<f64> = rows.iter().map(|&r| proba[(r, b)]).collect();
                    let auc_ab = binary_auc(ArrayView1::from(&scores_a[..]), &is_a);
                    let auc_ba = binary_auc(ArrayView1::from(&scores_b[..]), &is_b);
                    total += (auc_ab + auc_ba) / 2.0;
                    n_pairs += 1;
                }
            }
            total / n_pairs as f64
        }
    }
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    match values.len() {
        0 => (f64::NAN, f64::NAN),
        1 => (values[0], 0.0),
        _ => (values.iter().mean(), values.iter().std_dev()),
    }
}

/// Summarize the folds of one run.
pub fn summarize(results: &[FoldResult]) -> MetricSummary {
    let acc: Vec<f64> = results.iter().map(|r| r.acc).collect();
    let f1: Vec<f64> = results.iter().map(|r| r.f1).collect();
    let auc: Vec<f64> = results.iter().map(|r| r.roc_auc).collect();
    let (acc_mean, acc_std) = mean_std(&acc);
    let (f1_mean, f1_std) = mean_std(&f1);
    let (roc_auc_mean, roc_auc_std) = mean_std(&auc);
    MetricSummary {
        n_folds: results.len(),
        acc_mean,
        acc_std,
        f1_mean,
        f1_std,
        roc_auc_mean,
        roc_auc_std,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn perfect_ranking_has_unit_auc() {
        let scores = Array1::from_vec(vec![0.1, 0.2, 0.8, 0.9]);
        let auc = binary_auc(scores.view(), &[false, false, true, true]);
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ties_count_half() {
        let scores = Array1::from_vec(vec![0.5, 0.5]);
        let auc = binary_auc(scores.view(), &[false, true]);
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn binary_auc_matches_hand_count() {
        // pairs (pos, neg): (0.35 vs 0.1, 0.4) -> 1 + 0, (0.8 vs 0.1, 0.4) -> 1 + 1
        let scores = Array1::from_vec(vec![0.1, 0.4, 0.35, 0.8]);
        let auc = binary_auc(scores.view(), &[false, false, true, true]);
        assert!((auc - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ovo_three_classes_perfect() {
        let y = vec![0, 1, 2, 0, 1, 2];
        let proba = array![
            [0.8, 0.1, 0.1],
            [0.1, 0.8, 0.1],
            [0.1, 0.1, 0.8],
            [0.7, 0.2, 0.1],
            [0.2, 0.7, 0.1],
            [0.2, 0.1, 0.7],
        ];
        assert!((roc_auc_ovo(&y, &proba) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ovo_three_classes_with_overlap() {
        let y = vec![0, 0, 1, 1, 2, 2];
        let proba = array![
            [0.6, 0.3, 0.1],
            [0.3, 0.4, 0.3],
            [0.5, 0.4, 0.1],
            [0.2, 0.5, 0.3],
            [0.2, 0.3, 0.5],
            [0.4, 0.2, 0.4],
        ];
        // pair (0, 1): (3/4 + 3.5/4) / 2, pair (0, 2): (3/4 + 1) / 2, pair (1, 2): 1
        let expected = (0.8125 + 0.875 + 1.0) / 3.0;
        assert!((roc_auc_ovo(&y, &proba) - expected).abs() < 1e-12);
    }

    #[test]
    fn ovo_two_of_three_classes_uses_greater_class_column() {
        let y = vec![0, 0, 2, 2];
        let proba = array![
            [0.7, 0.2, 0.1],
            [0.3, 0.3, 0.4],
            [0.5, 0.1, 0.4],
            [0.1, 0.2, 0.7],
        ];
        // class 2 scores {0.4, 0.7} against class 0 scores {0.1, 0.4}, one tie
        assert!((roc_auc_ovo(&y, &proba) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn ovo_single_class_is_half() {
        let y = vec![1, 1];
        let proba = array![[0.2, 0.8], [0.6, 0.4]];
        assert_eq!(roc_auc_ovo(&y, &proba), 0.5);
    }

    #[test]
    fn f1_macro_counts_predicted_only_labels() {
        // class 2 only appears in predictions and scores zero
        let y_true = vec![0, 0, 1, 1];
        let y_pred = vec![0, 0, 1, 2];
        let f1 = f1_macro(&y_true, &y_pred);
        let expected = (1.0 + 2.0 / 3.0 + 0.0) / 3.0;
        assert!((f1 - expected).abs() < 1e-12);
    }

    #[test]
    fn summary_of_single_fold_has_zero_std() {
        let results = vec![FoldResult {
            run: "cv_0".to_string(),
            acc: 0.5,
            f1: 0.4,
            roc_auc: 0.6,
        }];
        let s = summarize(&results);
        assert_eq!(s.acc_mean, 0.5);
        assert_eq!(s.acc_std, 0.0);
    }
}

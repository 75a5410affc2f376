use std::f64::consts::PI;

use anyhow::{bail, Result};
use ndarray::{Array1, Array2, Axis};

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_fit_input, present_classes};

/// Per-class Gaussian likelihoods of one fitted class.
#[derive(Debug, Clone)]
struct ClassStats {
    class: usize,
    log_prior: f64,
    mean: Array1<f64>,
    var: Array1<f64>,
}

/// Gaussian naive Bayes.
///
/// Variances are smoothed by `var_smoothing` times the largest feature
/// variance of the training data.
pub struct GaussianNBClassifier {
    params: ModelConfig,
    stats: Vec<ClassStats>,
    n_classes: usize,
}

impl GaussianNBClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GaussianNBClassifier {
            params,
            stats: Vec::new(),
            n_classes: 0,
        }
    }

    /// Joint log-likelihood of `sample` under each fitted class.
    fn joint_log_likelihood(&self, sample: ndarray::ArrayView1<f64>) -> Vec<f64> {
        self.stats
            .iter()
            .map(|s| {
                let mut ll = s.log_prior;
                for ((&v, &m), &var) in sample.iter().zip(s.mean.iter()).zip(s.var.iter()) {
                    ll -= 0.5 * (2.0 * PI * var).ln() + (v - m) * (v - m) / (2.0 * var);
                }
                ll
            })
            .collect()
    }
}

impl ClassifierModel for GaussianNBClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;
        let ModelType::NaiveBayes { var_smoothing } = self.params.model_type else {
            bail!(
                "Error: Expected ModelType::NaiveBayes params, got {:?}",
                self.params.model_type
            );
        };

        let max_var = x
            .var_axis(Axis(0), 0.0)
            .iter()
            .copied()
            .fold(0.0, f64::max);
        // constant data still needs a strictly positive variance
        let epsilon = (var_smoothing * max_var).max(f64::MIN_POSITIVE);

        let n_samples = x.nrows() as f64;
        self.stats = present_classes(y)
            .into_iter()
            .map(|class| {
                let rows: Vec<usize> = (0..y.len()).filter(|&r| y[r] == class).collect();
                let sub = x.select(Axis(0), &rows);
                let mean = sub
                    .mean_axis(Axis(0))
                    .unwrap_or_else(|| Array1::zeros(x.ncols()));
                let var = sub.var_axis(Axis(0), 0.0).mapv(|v| v + epsilon);
                ClassStats {
                    class,
                    log_prior: (rows.len() as f64 / n_samples).ln(),
                    mean,
                    var,
                }
            })
            .collect();
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.stats.is_empty() {
            return Err(BenchmarkError::NotFitted("GaussianNBClassifier").into());
        }
        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        for (r, sample) in x.axis_iter(Axis(0)).enumerate() {
            let jll = self.joint_log_likelihood(sample);
            let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let log_norm = max + jll.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
            for (s, ll) in self.stats.iter().zip(jll) {
                out[(r, s.class)] = (ll - log_norm).exp();
            }
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "NB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn gaussian_nb_separates_means() {
        let x = array![[1.0, 2.0], [1.2, 1.8], [0.9, 2.1], [5.0, 8.0], [5.2, 7.9], [4.8, 8.2]];
        let y = vec![0, 0, 0, 2, 2, 2];
        let mut nb = GaussianNBClassifier::new(ModelConfig::new(
            0,
            ModelType::NaiveBayes {
                var_smoothing: 1e-9,
            },
        ));
        nb.fit(&x, &y, 3).unwrap();

        let proba = nb.predict_proba(&array![[1.0, 2.0], [5.0, 8.0]]).unwrap();
        assert_eq!(proba.ncols(), 3);
        // class 1 never seen in training
        assert_eq!(proba[(0, 1)], 0.0);
        assert!(proba[(0, 0)] > 0.99);
        assert!(proba[(1, 2)] > 0.99);
        for row in proba.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }
}

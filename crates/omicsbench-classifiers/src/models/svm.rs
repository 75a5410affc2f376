use anyhow::{bail, Result};
use linfa::dataset::Pr;
use linfa::traits::Predict;
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2, Axis};

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_fit_input, constant_proba, present_classes};

/// Binary SVM for one pair of classes; `Pr` outputs are P(y == positive).
struct PairwiseSvm {
    negative: usize,
    positive: usize,
    model: Svm<f64, Pr>,
}

/// Support vector classifier with Platt-scaled probabilities.
///
/// Multiclass problems are decomposed one-vs-one. The pairwise probabilities
/// r_ij are coupled into class probabilities as p_i = 2 / (k (k - 1)) * sum_j r_ij,
/// which sums to one because r_ij + r_ji = 1.
pub struct SVMClassifier {
    params: ModelConfig,
    pairs: Vec<PairwiseSvm>,
    classes: Vec<usize>,
    n_classes: usize,
}

impl SVMClassifier {
    pub fn new(params: ModelConfig) -> Self {
        SVMClassifier {
            params,
            pairs: Vec::new(),
            classes: Vec::new(),
            n_classes: 0,
        }
    }

    fn svm_params(&self) -> Result<SvmParams<f64, Pr>> {
        let ModelType::SVM {
            eps,
            c,
            kernel,
            gaussian_kernel_eps,
            polynomial_kernel_constant,
            polynomial_kernel_degree,
        } = &self.params.model_type
        else {
            bail!(
                "Error: Expected ModelType::SVM params, got {:?}",
                self.params.model_type
            );
        };

        let (c1, c2) = *c;
        let model: SvmParams<f64, Pr> = Svm::<f64, Pr>::params().eps(*eps).pos_neg_weights(c1, c2);

        // Chain the kernel configuration based on the kernel type
        let model = match kernel.as_str() {
            "linear" => model.linear_kernel(),
            "gauss" => model.gaussian_kernel(*gaussian_kernel_eps),
            "poly" => model.polynomial_kernel(*polynomial_kernel_constant, *polynomial_kernel_degree),
            _ => bail!(
                "Unsupported kernel type: {}. Valid options are: linear, gauss, poly",
                kernel
            ),
        };
        Ok(model)
    }
}

impl ClassifierModel for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;
        let params = self.svm_params()?;

        self.classes = present_classes(y);
        self.n_classes = n_classes;
        self.pairs.clear();

        for (i, &negative) in self.classes.iter().enumerate() {
            for &positive in &self.classes[i + 1..] {
                let rows: Vec<usize> = (0..y.len())
                    .filter(|&r| y[r] == negative || y[r] == positive)
                    .collect();
                let targets: Array1<bool> = rows.iter().map(|&r| y[r] == positive).collect();
                let dataset = Dataset::new(x.select(Axis(0), &rows), targets);

                let model = <SvmParams<f64, Pr> as linfa::traits::Fit<_, _, _>>::fit(&params, &dataset)?;
                log::trace!(
                    "SVM pair ({}, {}) fitted on {} samples",
                    negative,
                    positive,
                    rows.len()
                );
                self.pairs.push(PairwiseSvm {
                    negative,
                    positive,
                    model,
                });
            }
        }
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self.classes.len() {
            0 => return Err(BenchmarkError::NotFitted("SVMClassifier").into()),
            1 => return Ok(constant_proba(x.nrows(), self.n_classes, self.classes[0])),
            _ => {}
        }

        let k = self.classes.len() as f64;
        let scale = 2.0 / (k * (k - 1.0));
        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        for pair in &self.pairs {
            let predictions: Array1<Pr> = pair.model.predict(x);
            for (r, p) in predictions.iter().enumerate() {
                let p = (**p as f64).clamp(0.0, 1.0);
                out[(r, pair.positive)] += scale * p;
                out[(r, pair.negative)] += scale * (1.0 - p);
            }
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "SVM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn linear_svm() -> SVMClassifier {
        SVMClassifier::new(ModelConfig::new(
            0,
            ModelType::SVM {
                eps: 0.1,
                c: (1.0, 1.0),
                kernel: "linear".to_string(),
                gaussian_kernel_eps: 0.1,
                polynomial_kernel_constant: 1.0,
                polynomial_kernel_degree: 3.0,
            },
        ))
    }

    #[test]
    fn three_class_probabilities_sum_to_one() {
        let x = array![
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [5.0, 0.0],
            [5.2, 0.1],
            [4.9, 0.2],
            [0.0, 5.0],
            [0.1, 5.2],
            [0.3, 4.8],
        ];
        let y = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let mut svm = linear_svm();
        svm.fit(&x, &y, 3).unwrap();

        let proba = svm.predict_proba(&x).unwrap();
        assert_eq!(proba.shape(), &[9, 3]);
        for row in proba.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn unsupported_kernel_errors() {
        let mut svm = SVMClassifier::new(ModelConfig::new(
            0,
            ModelType::SVM {
                eps: 0.1,
                c: (1.0, 1.0),
                kernel: "sigmoid".to_string(),
                gaussian_kernel_eps: 0.1,
                polynomial_kernel_constant: 1.0,
                polynomial_kernel_degree: 3.0,
            },
        ));
        assert!(svm.fit(&array![[0.0], [1.0]], &[0, 1], 2).is_err());
    }
}

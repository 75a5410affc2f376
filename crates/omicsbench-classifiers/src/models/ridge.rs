use anyhow::{bail, Result};
use ndarray::{Array1, Array2, Axis};

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_fit_input, cholesky_solve, column_means, constant_proba, present_classes, softmax_rows,
};

/// Ridge regression on one-vs-rest {-1, 1} targets, classified by the largest
/// decision value.
///
/// Ridge has no probabilistic output; `predict_proba` returns the softmax of
/// the decision values over the classes seen in training.
pub struct RidgeClassifier {
    params: ModelConfig,
    classes: Vec<usize>,
    /// (n_features, n_fitted_classes)
    coef: Option<Array2<f64>>,
    intercept: Array1<f64>,
    n_classes: usize,
}

impl RidgeClassifier {
    pub fn new(params: ModelConfig) -> Self {
        RidgeClassifier {
            params,
            classes: Vec::new(),
            coef: None,
            intercept: Array1::zeros(0),
            n_classes: 0,
        }
    }

    /// Decision values, one column per class id (unfitted classes stay at zero).
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let Some(coef) = self.coef.as_ref() else {
            return Err(BenchmarkError::NotFitted("RidgeClassifier").into());
        };
        let fitted = x.dot(coef) + &self.intercept;
        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        for (j, &class) in self.classes.iter().enumerate() {
            out.column_mut(class).assign(&fitted.column(j));
        }
        Ok(out)
    }
}

impl ClassifierModel for RidgeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;
        let ModelType::Ridge { alpha } = self.params.model_type else {
            bail!(
                "Error: Expected ModelType::Ridge params, got {:?}",
                self.params.model_type
            );
        };
        if alpha <= 0.0 {
            bail!("Ridge alpha must be positive, got {}", alpha);
        }

        self.classes = present_classes(y);
        self.n_classes = n_classes;
        let (n_samples, n_features) = x.dim();

        let targets = Array2::from_shape_fn((n_samples, self.classes.len()), |(r, j)| {
            if y[r] == self.classes[j] {
                1.0
            } else {
                -1.0
            }
        });

        let x_mean = column_means(x);
        let y_mean = column_means(&targets);
        let xc = x - &x_mean;
        let yc = &targets - &y_mean;

        // Solve in whichever space is smaller; both give the same coefficients.
        let coef = if n_features <= n_samples {
            let mut gram = xc.t().dot(&xc);
            gram.diag_mut().mapv_inplace(|v| v + alpha);
            cholesky_solve(&gram, &xc.t().dot(&yc))?
        } else {
            let mut kernel = xc.dot(&xc.t());
            kernel.diag_mut().mapv_inplace(|v| v + alpha);
            let dual = cholesky_solve(&kernel, &yc)?;
            xc.t().dot(&dual)
        };

        self.intercept = &y_mean - &x_mean.dot(&coef);
        self.coef = Some(coef);
        log::trace!(
            "Ridge fitted {} classes on {} samples x {} features",
            self.classes.len(),
            n_samples,
            n_features
        );
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.classes.len() == 1 {
            return Ok(constant_proba(x.nrows(), self.n_classes, self.classes[0]));
        }
        let scores = self.decision_function(x)?;
        Ok(softmax_rows(&scores, &self.classes))
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let scores = self.decision_function(x)?;
        Ok(scores
            .axis_iter(Axis(0))
            .map(|row| {
                let mut best = self.classes[0];
                for &c in &self.classes[1..] {
                    if row[c] > row[best] {
                        best = c;
                    }
                }
                best
            })
            .collect())
    }

    fn name(&self) -> &str {
        "ridge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ridge(alpha: f64) -> RidgeClassifier {
        RidgeClassifier::new(ModelConfig::new(0, ModelType::Ridge { alpha }))
    }

    #[test]
    fn primal_and_dual_agree() {
        // 3 samples x 2 features (primal) vs the same data padded to 4 features (dual)
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 1.0]];
        let x_wide = array![[0.0, 1.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0], [2.0, 1.0, 0.0, 0.0]];
        let y = vec![0, 1, 1];

        let mut a = ridge(0.5);
        let mut b = ridge(0.5);
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x_wide, &y, 2).unwrap();

        let da = a.decision_function(&x).unwrap();
        let db = b.decision_function(&x_wide).unwrap();
        for (u, v) in da.iter().zip(db.iter()) {
            assert!((u - v).abs() < 1e-9);
        }
    }

    #[test]
    fn separable_classes_are_recovered() {
        let x = array![[0.0], [0.2], [0.4], [3.0], [3.2], [3.4]];
        let y = vec![0, 0, 0, 1, 1, 1];
        let mut model = ridge(0.1);
        model.fit(&x, &y, 2).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[(0, 0)] > 0.5 && proba[(5, 1)] > 0.5);
    }

    #[test]
    fn rejects_non_positive_alpha() {
        let mut model = ridge(0.0);
        assert!(model.fit(&array![[0.0], [1.0]], &[0, 1], 2).is_err());
    }
}

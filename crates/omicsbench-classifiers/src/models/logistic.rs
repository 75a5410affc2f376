use anyhow::{bail, Result};
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_fit_input, constant_proba, present_classes};

/// Multinomial logistic regression with L2 penalty.
pub struct LogisticClassifier {
    params: ModelConfig,
    model: Option<MultiFittedLogisticRegression<f64, usize>>,
    single_class: Option<usize>,
    n_classes: usize,
}

impl LogisticClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticClassifier {
            params,
            model: None,
            single_class: None,
            n_classes: 0,
        }
    }
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;
        let ModelType::LogisticRegression {
            alpha,
            max_iterations,
        } = self.params.model_type
        else {
            bail!(
                "Error: Expected ModelType::LogisticRegression params, got {:?}",
                self.params.model_type
            );
        };

        self.n_classes = n_classes;
        let classes = present_classes(y);
        if classes.len() == 1 {
            self.single_class = Some(classes[0]);
            self.model = None;
            return Ok(());
        }
        self.single_class = None;

        let dataset = Dataset::new(x.to_owned(), Array1::from_vec(y.to_vec()));
        let model = MultiLogisticRegression::<f64>::default()
            .alpha(alpha)
            .max_iterations(max_iterations)
            .fit(&dataset)?;
        self.model = Some(model);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if let Some(class) = self.single_class {
            return Ok(constant_proba(x.nrows(), self.n_classes, class));
        }
        let Some(model) = self.model.as_ref() else {
            return Err(BenchmarkError::NotFitted("LogisticClassifier").into());
        };

        // linfa orders probability columns by `classes()`
        let fitted = model.predict_probabilities(x);
        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        for (j, &class) in model.classes().iter().enumerate() {
            out.column_mut(class).assign(&fitted.column(j));
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "LR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};

    #[test]
    fn probabilities_cover_unseen_classes() {
        let x = array![[0.0, 1.0], [0.2, 0.9], [0.1, 1.1], [3.0, 0.0], [3.1, 0.2], [2.9, 0.1]];
        let y = vec![0, 0, 0, 2, 2, 2];
        let mut lr = LogisticClassifier::new(ModelConfig::new(
            0,
            ModelType::LogisticRegression {
                alpha: 0.1,
                max_iterations: 100,
            },
        ));
        lr.fit(&x, &y, 3).unwrap();

        let proba = lr.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 3);
        for row in proba.axis_iter(Axis(0)) {
            assert_eq!(row[1], 0.0);
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
        assert_eq!(lr.predict(&x).unwrap(), y);
    }
}

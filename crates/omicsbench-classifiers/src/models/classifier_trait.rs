use anyhow::Result;
use ndarray::Array2;

use crate::models::utils::argmax_rows;

/// Contract shared by every classifier of the menu.
///
/// Labels are contiguous class ids `0..n_classes`. Probability matrices always
/// carry one column per class id, so classes missing from a training split get
/// a column of zeros.
pub trait ClassifierModel {
    /// Fit the model on `x` (samples x features) against class ids `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()>;

    /// Class probabilities, shape (n_samples, n_classes), rows summing to one.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Predicted class ids. Defaults to the most probable class.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

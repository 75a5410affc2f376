//! Per-fold feature standardization.
//!
//! The scaler is fit on the training split only and then applied to both the
//! training and validation splits, so no statistics leak across a fold.

use anyhow::{ensure, Result};
use ndarray::{Array1, Array2, Axis};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;
}

/// Fit a `Scaler` from an `Array2<f64>` where rows are samples and
/// columns are features. Uses the population standard deviation.
pub fn fit_scaler(x: &Array2<f64>) -> Result<Scaler> {
    let (nrows, ncols) = x.dim();
    ensure!(
        nrows > 0 && ncols > 0,
        "fit_scaler requires a non-empty matrix, got {} x {}",
        nrows,
        ncols
    );

    let mean = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(ncols));
    let std = x.std_axis(Axis(0), 0.0).mapv(|s| s.max(Scaler::MIN_STD));

    Ok(Scaler { mean, std })
}

/// Transform all rows using the provided `Scaler`.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Result<Array2<f64>> {
    ensure!(
        x.ncols() == sc.mean.len(),
        "Scaler was fit on {} features but the matrix has {}",
        sc.mean.len(),
        x.ncols()
    );
    Ok((x - &sc.mean) / &sc.std)
}

/// Fit on `train` and return both splits standardized with the training statistics.
pub fn scale_split(train: &Array2<f64>, validation: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
    let sc = fit_scaler(train)?;
    Ok((transform_all(train, &sc)?, transform_all(validation, &sc)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn training_split_becomes_zero_mean_unit_std() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let sc = fit_scaler(&x).unwrap();
        let z = transform_all(&x, &sc).unwrap();

        for c in 0..2 {
            assert!(z.column(c).mean().unwrap().abs() < 1e-12);
        }
        assert!((z.column(0).std(0.0) - 1.0).abs() < 1e-12);
        // constant column keeps the minimum std and maps to zero
        assert!(z.column(1).iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn validation_uses_training_statistics() {
        let train = array![[0.0], [2.0]];
        let validation = array![[4.0]];
        let (_, v) = scale_split(&train, &validation).unwrap();
        // mean 1, std 1
        assert!((v[(0, 0)] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(fit_scaler(&x).is_err());
    }
}

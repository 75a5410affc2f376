use std::collections::BTreeSet;

use anyhow::{ensure, Result};
use ndarray::{Array1, Array2, Axis};

/// Sorted class ids that occur in `y`.
pub fn present_classes(y: &[usize]) -> Vec<usize> {
    y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Row-wise argmax; the lowest column wins ties.
pub fn argmax_rows(proba: &Array2<f64>) -> Vec<usize> {
    proba
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Softmax over `columns` of each row; every other column is set to zero.
pub fn softmax_rows(scores: &Array2<f64>, columns: &[usize]) -> Array2<f64> {
    let mut out = Array2::zeros(scores.raw_dim());
    for (r, row) in scores.axis_iter(Axis(0)).enumerate() {
        let max = columns
            .iter()
            .map(|&c| row[c])
            .fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for &c in columns {
            let e = (row[c] - max).exp();
            out[(r, c)] = e;
            total += e;
        }
        for &c in columns {
            out[(r, c)] /= total;
        }
    }
    out
}

/// Rescale each row to sum to one; rows summing to zero spread uniformly over `columns`.
pub fn normalize_rows(proba: &mut Array2<f64>, columns: &[usize]) {
    for mut row in proba.axis_iter_mut(Axis(0)) {
        let total: f64 = row.sum();
        if total > 0.0 {
            row.mapv_inplace(|v| v / total);
        } else {
            for &c in columns {
                row[c] = 1.0 / columns.len() as f64;
            }
        }
    }
}

/// Probabilities putting all mass on `class`.
pub fn constant_proba(n_samples: usize, n_classes: usize, class: usize) -> Array2<f64> {
    let mut out = Array2::zeros((n_samples, n_classes));
    out.column_mut(class).fill(1.0);
    out
}

pub fn check_fit_input(x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
    ensure!(x.nrows() > 0, "Cannot fit on an empty training split");
    ensure!(
        x.nrows() == y.len(),
        "Feature matrix has {} rows but {} labels were given",
        x.nrows(),
        y.len()
    );
    ensure!(
        y.iter().all(|&c| c < n_classes),
        "Label id out of range for {} classes",
        n_classes
    );
    Ok(())
}

/// Solve `a * x = b` for a symmetric positive definite `a` via Cholesky.
pub fn cholesky_solve(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>> {
    let n = a.nrows();
    ensure!(a.ncols() == n, "Cholesky needs a square matrix");
    ensure!(b.nrows() == n, "Right-hand side has {} rows, expected {}", b.nrows(), n);

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            if i == j {
                ensure!(sum > 0.0, "Matrix is not positive definite");
                l[(i, i)] = sum.sqrt();
            } else {
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }

    let mut x = b.clone();
    for mut col in x.axis_iter_mut(Axis(1)) {
        // forward substitution: L z = b
        for i in 0..n {
            let mut sum = col[i];
            for k in 0..i {
                sum -= l[(i, k)] * col[k];
            }
            col[i] = sum / l[(i, i)];
        }
        // back substitution: L^T x = z
        for i in (0..n).rev() {
            let mut sum = col[i];
            for k in i + 1..n {
                sum -= l[(k, i)] * col[k];
            }
            col[i] = sum / l[(i, i)];
        }
    }
    Ok(x)
}

/// Column means of `x`.
pub fn column_means(x: &Array2<f64>) -> Array1<f64> {
    x.mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()))
}

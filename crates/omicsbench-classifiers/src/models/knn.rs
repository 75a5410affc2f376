use anyhow::{bail, Result};
use linfa_nn::distance::L2Dist;
use linfa_nn::{CommonNearestNeighbour, NearestNeighbour};
use ndarray::{Array2, Axis};

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::check_fit_input;

/// Euclidean k-nearest-neighbors with uniform votes, queried through a linfa-nn kd-tree.
pub struct KNNClassifier {
    params: ModelConfig,
    train_x: Option<Array2<f64>>,
    train_y: Vec<usize>,
    n_classes: usize,
}

impl KNNClassifier {
    pub fn new(params: ModelConfig) -> Self {
        KNNClassifier {
            params,
            train_x: None,
            train_y: Vec::new(),
            n_classes: 0,
        }
    }

    fn n_neighbors(&self) -> Result<usize> {
        match &self.params.model_type {
            ModelType::KNN { n_neighbors } if *n_neighbors > 0 => Ok(*n_neighbors),
            ModelType::KNN { .. } => bail!("n_neighbors must be positive"),
            other => bail!("Error: Expected ModelType::KNN params, got {:?}", other),
        }
    }
}

impl ClassifierModel for KNNClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;
        let k = self.n_neighbors()?;
        if k > x.nrows() {
            log::debug!(
                "n_neighbors = {} exceeds {} training samples; using all of them",
                k,
                x.nrows()
            );
        }
        self.train_x = Some(x.to_owned());
        self.train_y = y.to_vec();
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let Some(train_x) = self.train_x.as_ref() else {
            return Err(BenchmarkError::NotFitted("KNNClassifier").into());
        };
        let k = self.n_neighbors()?.min(train_x.nrows());

        // The index borrows the training matrix, so it is rebuilt per call.
        let index = CommonNearestNeighbour::KdTree.from_batch(train_x, L2Dist)?;
        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        for (r, sample) in x.axis_iter(Axis(0)).enumerate() {
            for (_, i) in index.k_nearest(sample, k)? {
                out[(r, self.train_y[i])] += 1.0 / k as f64;
            }
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "KNN"
    }
}

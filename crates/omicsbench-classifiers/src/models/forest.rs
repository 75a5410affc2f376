use anyhow::{bail, Result};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::tree::{DecisionTreeClassifier, TreeParams};
use crate::models::utils::check_fit_input;

/// Bagged CART trees with a random feature subset at every split.
///
/// Trees are grown in parallel; each draws its bootstrap sample and feature
/// subsets from its own generator seeded from the model seed and the tree
/// index, so results do not depend on thread scheduling.
pub struct RandomForestClassifier {
    params: ModelConfig,
    trees: Vec<DecisionTreeClassifier>,
    n_classes: usize,
}

impl RandomForestClassifier {
    pub fn new(params: ModelConfig) -> Self {
        RandomForestClassifier {
            params,
            trees: Vec::new(),
            n_classes: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Number of features drawn per split for a `max_features` rule.
pub fn resolve_max_features(rule: &str, n_features: usize) -> Result<usize> {
    let m = match rule.to_lowercase().as_str() {
        "sqrt" => (n_features as f64).sqrt().floor() as usize,
        "log2" => (n_features as f64).log2().floor() as usize,
        "all" | "none" => n_features,
        _ => bail!(
            "Unsupported max_features rule: {}. Valid options are: sqrt, log2, all",
            rule
        ),
    };
    Ok(m.clamp(1, n_features.max(1)))
}

fn tree_seed(seed: u64, tree: usize) -> u64 {
    seed ^ (tree as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;

        let ModelType::RandomForest {
            n_estimators,
            max_depth,
            min_samples_split,
            max_features,
        } = &self.params.model_type
        else {
            bail!(
                "Error: Expected ModelType::RandomForest params, got {:?}",
                self.params.model_type
            );
        };

        let tree_params = TreeParams {
            max_depth: *max_depth,
            min_samples_split: *min_samples_split,
            max_features: Some(resolve_max_features(max_features, x.ncols())?),
        };
        let n_samples = x.nrows();
        let seed = self.params.seed;

        self.trees = (0..*n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(tree_seed(seed, i));
                let rows: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                let mut tree = DecisionTreeClassifier::new(tree_params.clone(), seed);
                tree.fit_rows(x, y, n_classes, rows, &mut rng);
                tree
            })
            .collect();
        self.n_classes = n_classes;

        log::trace!(
            "Random forest fitted {} trees on {} samples x {} features",
            self.trees.len(),
            n_samples,
            x.ncols()
        );
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(BenchmarkError::NotFitted("RandomForestClassifier").into());
        }
        let mut out = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (r, sample) in x.axis_iter(Axis(0)).enumerate() {
            for tree in &self.trees {
                for (c, &p) in tree.leaf_proba(sample).iter().enumerate() {
                    out[(r, c)] += p;
                }
            }
        }
        out.mapv_inplace(|v| v / self.trees.len() as f64);
        Ok(out)
    }

    fn name(&self) -> &str {
        "RF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn forest(n_estimators: usize, seed: u64) -> RandomForestClassifier {
        RandomForestClassifier::new(ModelConfig::new(
            seed,
            ModelType::RandomForest {
                n_estimators,
                max_depth: None,
                min_samples_split: 2,
                max_features: "sqrt".to_string(),
            },
        ))
    }

    #[test]
    fn max_features_rules() {
        assert_eq!(resolve_max_features("sqrt", 100).unwrap(), 10);
        assert_eq!(resolve_max_features("log2", 1024).unwrap(), 10);
        assert_eq!(resolve_max_features("all", 7).unwrap(), 7);
        assert_eq!(resolve_max_features("sqrt", 1).unwrap(), 1);
        assert!(resolve_max_features("half", 10).is_err());
    }

    #[test]
    fn same_seed_same_probabilities() {
        let x = array![
            [0.0, 1.0, 0.2],
            [0.1, 0.9, 0.1],
            [0.2, 1.1, 0.3],
            [1.0, 0.0, 0.8],
            [0.9, 0.2, 0.9],
            [1.1, 0.1, 0.7],
        ];
        let y = vec![0, 0, 0, 1, 1, 1];

        let mut a = forest(20, 7);
        let mut b = forest(20, 7);
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();
        assert_eq!(a.n_trees(), 20);
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
        assert_eq!(a.predict(&x).unwrap(), y);
    }
}

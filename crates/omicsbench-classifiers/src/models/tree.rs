//! CART decision tree with Gini impurity.
//!
//! Leaves store the class frequencies of their training samples, which serve
//! as probability estimates. The same tree is the base learner of the random
//! forest, which passes bootstrap row sets and a per-split feature budget.
use anyhow::Result;
use ndarray::{Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::check_fit_input;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Number of features drawn at each split; `None` evaluates all of them
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        proba: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct BestSplit {
    impurity: f64,
    feature: usize,
    threshold: f64,
}

pub struct DecisionTreeClassifier {
    params: TreeParams,
    seed: u64,
    nodes: Vec<Node>,
    n_classes: usize,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams, seed: u64) -> Self {
        DecisionTreeClassifier {
            params,
            seed,
            nodes: Vec::new(),
            n_classes: 0,
        }
    }

    pub fn from_config(config: ModelConfig) -> Self {
        let params = match config.model_type {
            ModelType::DecisionTree {
                max_depth,
                min_samples_split,
            } => TreeParams {
                max_depth,
                min_samples_split,
                max_features: None,
            },
            other => {
                log::warn!(
                    "Expected ModelType::DecisionTree params, got {:?}; using defaults",
                    other
                );
                TreeParams::default()
            }
        };
        Self::new(params, config.seed)
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Grow the tree on the given (possibly repeated) row indices.
    pub(crate) fn fit_rows(
        &mut self,
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        rows: Vec<usize>,
        rng: &mut StdRng,
    ) {
        self.nodes.clear();
        self.n_classes = n_classes;
        self.build(x, y, rows, 0, rng);
    }

    fn build(&mut self, x: &Array2<f64>, y: &[usize], rows: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let mut counts = vec![0usize; self.n_classes];
        for &r in &rows {
            counts[y[r]] += 1;
        }
        let n = rows.len();
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);

        let split = if is_pure || depth_reached || n < self.params.min_samples_split.max(2) {
            None
        } else {
            self.best_split(x, y, &rows, &counts, rng)
        };

        let Some(split) = split else {
            let proba = counts.iter().map(|&c| c as f64 / n.max(1) as f64).collect();
            self.nodes.push(Node::Leaf { proba });
            return self.nodes.len() - 1;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| x[(r, split.feature)] <= split.threshold);

        let idx = self.nodes.len();
        // placeholder until both children are known
        self.nodes.push(Node::Leaf { proba: Vec::new() });
        let left = self.build(x, y, left_rows, depth + 1, rng);
        let right = self.build(x, y, right_rows, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        rows: &[usize],
        counts: &[usize],
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let n_features = x.ncols();
        let candidates: Vec<usize> = match self.params.max_features {
            Some(m) if m < n_features => rand::seq::index::sample(rng, n_features, m).into_vec(),
            _ => (0..n_features).collect(),
        };

        let n = rows.len();
        let total_sq: f64 = counts.iter().map(|&c| (c * c) as f64).sum();
        let mut best: Option<BestSplit> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

        for feature in candidates {
            sorted.clear();
            sorted.extend(rows.iter().map(|&r| (x[(r, feature)], y[r])));
            sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left = vec![0usize; self.n_classes];
            let mut left_sq = 0.0;
            let mut right_sq = total_sq;
            for i in 0..n - 1 {
                let class = sorted[i].1;
                // (c + 1)^2 - c^2 on the left, c^2 - (c - 1)^2 on the right
                left_sq += (2 * left[class] + 1) as f64;
                right_sq -= (2 * (counts[class] - left[class]) - 1) as f64;
                left[class] += 1;

                if sorted[i].0 == sorted[i + 1].0 {
                    continue;
                }
                let n_left = (i + 1) as f64;
                let n_right = (n - i - 1) as f64;
                // sample-weighted Gini impurity of both children
                let impurity = (n_left - left_sq / n_left) + (n_right - right_sq / n_right);
                if best.as_ref().map_or(true, |b| impurity < b.impurity - 1e-12) {
                    let (lo, hi) = (sorted[i].0, sorted[i + 1].0);
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(BestSplit {
                        impurity,
                        feature,
                        threshold,
                    });
                }
            }
        }
        best
    }

    /// Leaf class frequencies reached by one sample.
    pub(crate) fn leaf_proba(&self, sample: ArrayView1<f64>) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.fit_rows(x, y, n_classes, (0..x.nrows()).collect(), &mut rng);
        log::trace!(
            "Decision tree grown with {} nodes ({} leaves)",
            self.n_nodes(),
            self.n_leaves()
        );
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.nodes.is_empty() {
            return Err(BenchmarkError::NotFitted("DecisionTreeClassifier").into());
        }
        let mut out = Array2::zeros((x.nrows(), self.n_classes));
        for (r, sample) in x.axis_iter(Axis(0)).enumerate() {
            for (c, &p) in self.leaf_proba(sample).iter().enumerate() {
                out[(r, c)] = p;
            }
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "DT"
    }
}

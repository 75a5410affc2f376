use anyhow::{bail, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array2, Axis};

use crate::config::{ModelConfig, ModelType};
use crate::error::BenchmarkError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_fit_input, constant_proba, normalize_rows, present_classes};

/// Gradient Boosting Decision Tree (GBDT) classifier
///
/// Multiclass problems are handled one-vs-rest: one binary booster per class
/// seen in training, with the per-class probabilities renormalized. Two
/// classes share a single booster.
pub struct GBDTClassifier {
    boosters: Vec<(usize, GBDT)>,
    classes: Vec<usize>,
    n_classes: usize,
    params: ModelConfig,
}

impl GBDTClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GBDTClassifier {
            boosters: Vec::new(),
            classes: Vec::new(),
            n_classes: 0,
            params,
        }
    }

    fn to_data_vec(x: &Array2<f64>, labels: Option<&[f32]>) -> DataVec {
        let mut data = DataVec::new();
        for (i, row) in x.axis_iter(Axis(0)).enumerate() {
            let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
            let label = labels.map_or(0.0, |l| l[i]);
            data.push(Data::new_training_data(features, 1.0, label, None));
        }
        data
    }

    /// Probability of the positive class from one booster, clamped to [0, 1].
    fn positive_proba(booster: &GBDT, data: &DataVec) -> Vec<f64> {
        booster
            .predict(data)
            .into_iter()
            .map(|p| (p as f64).clamp(0.0, 1.0))
            .collect()
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_input(x, y, n_classes)?;
        let feature_size = x.ncols();

        match &self.params.model_type {
            ModelType::GBDT {
                max_depth,
                num_boost_round,
                learning_rate,
                debug,
                training_optimization_level,
                loss_type,
            } => {
                let mut config = Config::new();

                config.set_feature_size(feature_size);
                config.set_shrinkage(*learning_rate);
                config.set_max_depth(*max_depth);
                config.set_iterations(*num_boost_round as usize);
                config.set_debug(*debug);
                config.set_training_optimization_level(*training_optimization_level);
                config.set_loss(loss_type);

                self.classes = present_classes(y);
                self.n_classes = n_classes;
                self.boosters.clear();

                // with two classes the booster of the greater id covers both
                let one_vs_rest: Vec<usize> = match self.classes.len() {
                    1 => Vec::new(),
                    2 => vec![self.classes[1]],
                    _ => self.classes.clone(),
                };

                for class in one_vs_rest {
                    // LogLikelyhood expects labels in {-1, 1}
                    let labels: Vec<f32> = y.iter().map(|&c| if c == class { 1.0 } else { -1.0 }).collect();
                    let mut train_x = Self::to_data_vec(x, Some(&labels));

                    let mut gbdt = GBDT::new(&config);
                    gbdt.fit(&mut train_x);
                    self.boosters.push((class, gbdt));
                }
                log::trace!("GBDT fitted {} one-vs-rest boosters", self.boosters.len());
                Ok(())
            }
            other => bail!("Error: Expected ModelType::GBDT params, got {:?}", other),
        }
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self.classes.len() {
            0 => Err(BenchmarkError::NotFitted("GBDTClassifier").into()),
            1 => Ok(constant_proba(x.nrows(), self.n_classes, self.classes[0])),
            2 => {
                let test_x = Self::to_data_vec(x, None);
                let (positive, booster) = &self.boosters[0];
                let negative = self.classes[0];
                let mut out = Array2::zeros((x.nrows(), self.n_classes));
                for (r, p) in Self::positive_proba(booster, &test_x).into_iter().enumerate() {
                    out[(r, *positive)] = p;
                    out[(r, negative)] = 1.0 - p;
                }
                Ok(out)
            }
            _ => {
                let test_x = Self::to_data_vec(x, None);
                let mut out = Array2::zeros((x.nrows(), self.n_classes));
                for (class, booster) in &self.boosters {
                    for (r, p) in Self::positive_proba(booster, &test_x).into_iter().enumerate() {
                        out[(r, *class)] = p;
                    }
                }
                normalize_rows(&mut out, &self.classes);
                Ok(out)
            }
        }
    }

    fn name(&self) -> &str {
        "XGB"
    }
}

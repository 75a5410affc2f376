use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BenchmarkError;

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ModelConfig {
    /// Seed for every random component of the model (bootstrap, feature sampling)
    pub seed: u64,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
///
/// The menu mirrors the classic scikit-learn baselines used for subtype
/// benchmarking. Names accepted by [`ModelType::from_str`] are the short
/// menu names (`RF`, `XGB`, `LR`, `ridge`, `KNN`, `SVML`, `SVM`, `NB`, `DT`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    RandomForest {
        n_estimators: usize,
        max_depth: Option<usize>,
        min_samples_split: usize,
        /// One of "sqrt", "log2" or "all"
        max_features: String,
    },
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        learning_rate: f32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: String,
    },
    #[cfg(feature = "linfa")]
    LogisticRegression { alpha: f64, max_iterations: u64 },
    Ridge { alpha: f64 },
    KNN { n_neighbors: usize },
    #[cfg(feature = "linfa")]
    SVM {
        eps: f64,
        c: (f64, f64),
        kernel: String,
        gaussian_kernel_eps: f64,
        polynomial_kernel_constant: f64,
        polynomial_kernel_degree: f64,
    },
    NaiveBayes { var_smoothing: f64 },
    DecisionTree {
        max_depth: Option<usize>,
        min_samples_split: usize,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::random_forest()
    }
}

impl ModelType {
    fn random_forest() -> Self {
        ModelType::RandomForest {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: "sqrt".to_string(),
        }
    }

    #[cfg(feature = "linfa")]
    fn linear_svm() -> Self {
        ModelType::SVM {
            eps: 0.1,
            c: (1.0, 1.0),
            kernel: "linear".to_string(),
            gaussian_kernel_eps: 0.1,
            polynomial_kernel_constant: 1.0,
            polynomial_kernel_degree: 3.0,
        }
    }

    /// Short menu name of the model family.
    pub fn menu_name(&self) -> &'static str {
        match self {
            ModelType::RandomForest { .. } => "RF",
            ModelType::GBDT { .. } => "XGB",
            #[cfg(feature = "linfa")]
            ModelType::LogisticRegression { .. } => "LR",
            ModelType::Ridge { .. } => "ridge",
            ModelType::KNN { .. } => "KNN",
            #[cfg(feature = "linfa")]
            ModelType::SVM { kernel, .. } if kernel == "linear" => "SVML",
            #[cfg(feature = "linfa")]
            ModelType::SVM { .. } => "SVM",
            ModelType::NaiveBayes { .. } => "NB",
            ModelType::DecisionTree { .. } => "DT",
        }
    }

    /// All menu names accepted by `from_str`, in menu order.
    pub fn menu() -> &'static [&'static str] {
        &["RF", "XGB", "LR", "ridge", "KNN", "SVML", "SVM", "NB", "DT"]
    }
}

impl FromStr for ModelType {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Menu names are matched exactly; no case folding or aliases.
        match s {
            "RF" => Ok(ModelType::random_forest()),
            "XGB" => Ok(ModelType::GBDT {
                max_depth: 6,
                num_boost_round: 100,
                learning_rate: 0.3,
                debug: false,
                training_optimization_level: 2,
                loss_type: "LogLikelyhood".to_string(),
            }),
            #[cfg(feature = "linfa")]
            "LR" => Ok(ModelType::LogisticRegression {
                alpha: 1.0,
                max_iterations: 100,
            }),
            "ridge" => Ok(ModelType::Ridge { alpha: 1.0 }),
            "KNN" => Ok(ModelType::KNN { n_neighbors: 5 }),
            // Both SVM entries of the menu are linear-kernel SVCs.
            #[cfg(feature = "linfa")]
            "SVML" | "SVM" => Ok(ModelType::linear_svm()),
            "NB" => Ok(ModelType::NaiveBayes {
                var_smoothing: 1e-9,
            }),
            "DT" => Ok(ModelType::DecisionTree {
                max_depth: None,
                min_samples_split: 2,
            }),
            #[cfg(not(feature = "linfa"))]
            "LR" | "SVML" | "SVM" => Err(BenchmarkError::UnknownClassifier(format!(
                "{} (LR and SVM require compiling with `--features linfa`)",
                s
            ))),
            _ => Err(BenchmarkError::UnknownClassifier(s.to_string())),
        }
    }
}

impl ModelConfig {
    pub fn new(seed: u64, model_type: ModelType) -> Self {
        Self { seed, model_type }
    }

    /// Build the default configuration of a menu entry.
    pub fn from_name(name: &str, seed: u64) -> Result<Self, BenchmarkError> {
        Ok(Self::new(seed, ModelType::from_str(name)?))
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            model_type: ModelType::default(),
        }
    }
}

/// Repeated k-fold settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CvConfig {
    pub num_repeat: usize,
    pub num_fold: usize,
    /// Repeat `n` shuffles its folds with `seed + n`
    pub seed: u64,
    /// Standardize features with statistics of the training split
    pub scale_features: bool,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            num_repeat: 5,
            num_fold: 5,
            seed: 1,
            scale_features: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_names_round_trip() {
        for name in ModelType::menu() {
            let parsed = ModelType::from_str(name);
            #[cfg(not(feature = "linfa"))]
            if matches!(*name, "LR" | "SVML" | "SVM") {
                assert!(parsed.is_err());
                continue;
            }
            let parsed = parsed.unwrap();
            if *name == "SVM" {
                assert_eq!(parsed.menu_name(), "SVML");
            } else {
                assert_eq!(parsed.menu_name(), *name);
            }
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = ModelType::from_str("GPT").unwrap_err();
        assert_eq!(err, BenchmarkError::UnknownClassifier("GPT".to_string()));
    }

    #[test]
    fn menu_names_are_case_sensitive() {
        for name in ["rf", "Ridge", "random_forest", "xgboost", "gbdt", "knn", "dt", "svml"] {
            let err = ModelType::from_str(name).unwrap_err();
            assert_eq!(err, BenchmarkError::UnknownClassifier(name.to_string()));
        }
    }
}

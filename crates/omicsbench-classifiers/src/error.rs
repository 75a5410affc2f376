use std::error::Error;
use std::fmt;

/// Domain failures raised while preparing or evaluating a cross-validation run.
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkError {
    /// Classifier name not present in the menu
    UnknownClassifier(String),
    LengthMismatch { expected: usize, found: usize },
    /// A fold split ended up with no labelled samples
    EmptySplit { fold: usize, split: &'static str },
    NotFitted(&'static str),
}

impl fmt::Display for BenchmarkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BenchmarkError::UnknownClassifier(name) => write!(
                f,
                "Unknown classifier: {}. Valid options are: RF, XGB, LR, ridge, KNN, SVML, SVM, NB, DT",
                name
            ),
            BenchmarkError::LengthMismatch { expected, found } => write!(
                f,
                "Length mismatch: expected {} rows but found {}",
                expected, found
            ),
            BenchmarkError::EmptySplit { fold, split } => {
                write!(f, "Fold {} has no labelled samples in its {} split", fold, split)
            }
            BenchmarkError::NotFitted(model) => {
                write!(f, "{} must be fitted before predicting", model)
            }
        }
    }
}

impl Error for BenchmarkError {}

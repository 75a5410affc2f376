use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;

/// Build a boxed classifier model from a `ModelConfig`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_model(params: &ModelConfig) -> Box<dyn ClassifierModel> {
    match &params.model_type {
        ModelType::RandomForest { .. } => Box::new(crate::models::forest::RandomForestClassifier::new(params.clone())),

        ModelType::GBDT { .. } => Box::new(crate::models::gbdt::GBDTClassifier::new(params.clone())),

        #[cfg(feature = "linfa")]
        ModelType::LogisticRegression { .. } => {
            Box::new(crate::models::logistic::LogisticClassifier::new(params.clone()))
        }

        ModelType::Ridge { .. } => Box::new(crate::models::ridge::RidgeClassifier::new(params.clone())),

        ModelType::KNN { .. } => Box::new(crate::models::knn::KNNClassifier::new(params.clone())),

        #[cfg(feature = "linfa")]
        ModelType::SVM { .. } => Box::new(crate::models::svm::SVMClassifier::new(params.clone())),

        ModelType::NaiveBayes { .. } => {
            Box::new(crate::models::naive_bayes::GaussianNBClassifier::new(params.clone()))
        }

        ModelType::DecisionTree { .. } => {
            Box::new(crate::models::tree::DecisionTreeClassifier::from_config(params.clone()))
        }
    }
}

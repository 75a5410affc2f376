pub mod forest;
pub mod gbdt;
pub mod knn;
#[cfg(feature = "linfa")]
pub mod logistic;
pub mod naive_bayes;
pub mod ridge;
#[cfg(feature = "linfa")]
pub mod svm;
pub mod tree;
pub mod utils;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::ClassifierModel;
pub use factory::build_model;

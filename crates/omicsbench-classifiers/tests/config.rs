//! Integration tests for JSON model and cross-validation configs.

use omicsbench_classifiers::config::{CvConfig, ModelConfig, ModelType};

#[test]
fn model_config_reads_flattened_model_type() {
    let json = r#"{
        "seed": 7,
        "KNN": { "n_neighbors": 3 }
    }"#;
    let config: ModelConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.model_type, ModelType::KNN { n_neighbors: 3 });
    assert_eq!(config.model_type.menu_name(), "KNN");
}

#[test]
fn cv_config_fills_missing_fields() {
    let config: CvConfig = serde_json::from_str(r#"{ "num_fold": 3 }"#).unwrap();
    assert_eq!(config.num_fold, 3);
    assert_eq!(config.num_repeat, 5);
    assert_eq!(config.seed, 1);
    assert!(!config.scale_features);
}

#[test]
fn default_model_is_random_forest() {
    let config = ModelConfig::default();
    assert_eq!(config.model_type.menu_name(), "RF");
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["RandomForest"]["max_features"], "sqrt");
}

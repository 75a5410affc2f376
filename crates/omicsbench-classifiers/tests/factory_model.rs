use ndarray::Array2;
use omicsbench_classifiers::config::{ModelConfig, ModelType};
use omicsbench_classifiers::models::build_model;

#[test]
fn test_factory_builds_and_predicts() {
    // tiny dataset
    let x = Array2::from_shape_vec(
        (6, 2),
        vec![
            1.0, 0.0, // class 1
            0.0, 1.0, // class 0
            1.0, 0.1, // class 1
            0.0, 0.9, // class 0
            1.1, 0.0, // class 1
            0.0, 1.2, // class 0
        ],
    )
    .expect("failed to create feature matrix");
    let y = vec![1, 0, 1, 0, 1, 0];

    let params = ModelConfig::new(
        1,
        ModelType::GBDT {
            max_depth: 3,
            num_boost_round: 3,
            learning_rate: 0.1,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
        },
    );

    let mut model = build_model(&params);
    model.fit(&x, &y, 2).unwrap();
    let probs = model.predict_proba(&x).unwrap();
    assert_eq!(probs.dim(), (x.nrows(), 2));
}

#[test]
fn every_menu_entry_builds_a_named_model() {
    let x = Array2::from_shape_vec((6, 1), vec![0.0, 0.1, 0.2, 2.0, 2.1, 2.2]).unwrap();
    let y = vec![0, 0, 0, 1, 1, 1];

    for name in ModelType::menu() {
        let Ok(params) = ModelConfig::from_name(name, 1) else {
            // LR and SVM are unavailable without the linfa feature
            assert!(!cfg!(feature = "linfa"), "{} should parse", name);
            continue;
        };
        let mut model = build_model(&params);
        model.fit(&x, &y, 3).unwrap();

        let probs = model.predict_proba(&x).unwrap();
        assert_eq!(probs.dim(), (6, 3), "{}", model.name());
        for row in probs.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-6, "{} rows must sum to one", model.name());
            // class 2 never appears in training
            assert_eq!(row[2], 0.0, "{}", model.name());
        }
        assert_eq!(model.predict(&x).unwrap().len(), 6);
    }
}

#[test]
fn predicting_before_fit_errors() {
    let x = Array2::<f64>::zeros((2, 2));
    for name in ["RF", "XGB", "ridge", "KNN", "NB", "DT"] {
        let model = build_model(&ModelConfig::from_name(name, 1).unwrap());
        assert!(model.predict_proba(&x).is_err(), "{}", name);
    }
}

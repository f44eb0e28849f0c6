use iris_api::{
    Error,
    config::TrainingConfig,
    dataset::load_iris,
    model::{ModelArtifact, Species},
    training,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

mod common;

use common::{SETOSA, VERSICOLOR, VIRGINICA, test_training_config, trained_artifact};

#[test_log::test]
fn test_default_training_reaches_high_accuracy() {
    let (artifact, report) = training::train_iris(&TrainingConfig::default()).unwrap();

    assert_eq!(report.n_test, 30);
    assert_eq!(report.n_train, 120);
    assert!(report.accuracy >= 0.8, "accuracy was {}", report.accuracy);
    assert_eq!(artifact.accuracy, Some(report.accuracy));
    assert_eq!(artifact.forest.trees().len(), 100);
}

#[test]
fn test_classification_report_covers_every_species() {
    let (_, report) = training::train_iris(&test_training_config()).unwrap();
    let labels: Vec<&str> = report
        .classification
        .classes
        .iter()
        .map(|m| m.label.as_str())
        .collect();
    assert_eq!(labels, vec!["setosa", "versicolor", "virginica"]);

    let support: usize = report.classification.classes.iter().map(|m| m.support).sum();
    assert_eq!(support, report.n_test);
    assert!(report.classification.to_string().contains("weighted avg"));
}

#[test]
fn test_training_is_reproducible_for_a_seed() {
    let config = test_training_config();
    let (a, _) = training::train_iris(&config).unwrap();
    let (b, _) = training::train_iris(&config).unwrap();
    assert_eq!(a.forest, b.forest);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_rejects_bad_split_size() {
    let config = TrainingConfig {
        test_size: 1.5,
        ..test_training_config()
    };
    let data = load_iris().unwrap();
    assert!(matches!(training::train(&data, &config), Err(Error::Dataset(_))));
}

#[rstest]
#[case::setosa(SETOSA, Species::Setosa)]
#[case::versicolor(VERSICOLOR, Species::Versicolor)]
#[case::virginica(VIRGINICA, Species::Virginica)]
fn test_predicts_canonical_samples(#[case] features: [f64; 4], #[case] expected: Species) {
    let prediction = trained_artifact().predict(&features).unwrap();
    assert_eq!(prediction.species, expected);
    assert_eq!(prediction.probabilities.len(), 3);
    assert!((prediction.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn test_first_sample_of_each_class_gets_a_valid_class() {
    let data = load_iris().unwrap();
    let artifact = trained_artifact();
    for class in 0..3 {
        let row = data.targets.iter().position(|&t| t == class).unwrap();
        let prediction = artifact.predict(&data.features[row]).unwrap();
        assert!(prediction.species.index() <= 2);
    }
}

#[test]
fn test_artifact_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("model.json");
    let artifact = trained_artifact();

    artifact.save(&path).unwrap();
    assert!(path.exists());

    let loaded = ModelArtifact::load(&path).unwrap();
    assert_eq!(loaded.id, artifact.id);
    assert_eq!(loaded.class_names, vec!["setosa", "versicolor", "virginica"]);
    assert_eq!(
        loaded.predict(&VIRGINICA).unwrap().species,
        artifact.predict(&VIRGINICA).unwrap().species
    );
}

#[test]
fn test_load_missing_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let err = ModelArtifact::load(temp_dir.path().join("model.json")).unwrap_err();
    assert!(err.is_model_unavailable());
    assert!(err.to_string().contains("train"));
}

#[test]
fn test_load_rejects_mismatched_classes() {
    let mut value = serde_json::to_value(trained_artifact()).unwrap();
    value["class_names"] = serde_json::json!(["a", "b", "c"]);

    let err = ModelArtifact::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}

#[test]
fn test_load_rejects_empty_forest() {
    let mut value = serde_json::to_value(trained_artifact()).unwrap();
    value["forest"]["trees"] = serde_json::json!([]);

    let err = ModelArtifact::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}

#[rstest]
#[case::too_few_classes(serde_json::json!([1.0, 0.0]))]
#[case::does_not_sum_to_one(serde_json::json!([5.0, 0.0, 0.0]))]
#[case::negative_entry(serde_json::json!([1.5, -0.5, 0.0]))]
fn test_load_rejects_bad_leaf_distribution(#[case] distribution: serde_json::Value) {
    let mut value = serde_json::to_value(trained_artifact()).unwrap();
    let nodes = value["forest"]["trees"][0]["nodes"].as_array_mut().unwrap();
    let leaf = nodes.iter_mut().find(|n| n["kind"] == "leaf").unwrap();
    leaf["distribution"] = distribution;

    let err = ModelArtifact::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}

#[test]
fn test_predict_rejects_wrong_feature_count() {
    let err = trained_artifact().predict(&[1.0, 2.0, 3.0]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

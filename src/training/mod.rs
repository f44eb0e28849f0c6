mod metrics;

pub use metrics::{ClassMetrics, ClassificationReport, accuracy_score};

use crate::config::TrainingConfig;
use crate::dataset::{Dataset, load_iris};
use crate::model::{ForestParams, ModelArtifact, RandomForest, Species};
use crate::Result;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub n_train: usize,
    pub n_test: usize,
    pub accuracy: f64,
    pub classification: ClassificationReport,
}

/// Splits `data`, fits a forest on the train part and scores it on the rest.
pub fn train(data: &Dataset, config: &TrainingConfig) -> Result<(ModelArtifact, TrainingReport)> {
    let (train_set, test_set) = data.train_test_split(config.test_size, config.seed)?;
    info!(
        n_train = train_set.len(),
        n_test = test_set.len(),
        n_estimators = config.n_estimators,
        "Training Random Forest classifier"
    );

    let forest = RandomForest::fit(&train_set, &ForestParams::from(config))?;

    let y_pred = test_set
        .features
        .iter()
        .map(|x| forest.predict(x))
        .collect::<Result<Vec<_>>>()?;
    let classification = ClassificationReport::new(&test_set.targets, &y_pred, &Species::names());
    let accuracy = classification.accuracy;
    info!(accuracy, "Model evaluated on held-out split");

    let report = TrainingReport {
        n_train: train_set.len(),
        n_test: test_set.len(),
        accuracy,
        classification,
    };
    Ok((ModelArtifact::new(forest, Some(accuracy)), report))
}

/// Trains on the bundled Iris dataset.
pub fn train_iris(config: &TrainingConfig) -> Result<(ModelArtifact, TrainingReport)> {
    let data = load_iris()?;
    train(&data, config)
}

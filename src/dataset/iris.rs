use super::{Dataset, FeatureVector, N_FEATURES};
use crate::model::Species;
use crate::{Error, Result};
use tracing::debug;

const IRIS_CSV: &str = include_str!("../../data/iris.csv");

pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// The Fisher Iris dataset bundled with the crate: 150 samples, 50 per species.
pub fn load_iris() -> Result<Dataset> {
    debug!("Loading Iris dataset");
    parse_csv(IRIS_CSV)
}

pub(crate) fn parse_csv(csv: &str) -> Result<Dataset> {
    let mut lines = csv.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::dataset("empty dataset"))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    if columns.len() != N_FEATURES + 1 || columns[..N_FEATURES] != FEATURE_NAMES {
        return Err(Error::dataset(format!("unexpected header: {}", header)));
    }

    let mut features = Vec::new();
    let mut targets = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let row = line_no + 2;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != N_FEATURES + 1 {
            return Err(Error::dataset(format!(
                "row {}: expected {} columns, got {}",
                row,
                N_FEATURES + 1,
                fields.len()
            )));
        }

        let mut sample: FeatureVector = [0.0; N_FEATURES];
        for (slot, field) in sample.iter_mut().zip(&fields[..N_FEATURES]) {
            let value: f64 = field
                .parse()
                .map_err(|_| Error::dataset(format!("row {}: '{}' is not a number", row, field)))?;
            if !value.is_finite() {
                return Err(Error::dataset(format!("row {}: non-finite value", row)));
            }
            *slot = value;
        }

        let target: usize = fields[N_FEATURES]
            .parse()
            .map_err(|_| Error::dataset(format!("row {}: bad label '{}'", row, fields[N_FEATURES])))?;

        features.push(sample);
        targets.push(target);
    }

    Dataset::new(features, targets, Species::COUNT)
}

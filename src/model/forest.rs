use super::tree::{DecisionTree, TreeParams};
use crate::config::TrainingConfig;
use crate::dataset::{Dataset, N_FEATURES};
use crate::{Error, Result};
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
    pub tree: TreeParams,
}

impl From<&TrainingConfig> for ForestParams {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            n_estimators: config.n_estimators,
            seed: config.seed,
            tree: TreeParams {
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
                max_features: config.max_features.resolve(N_FEATURES),
            },
        }
    }
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::from(&TrainingConfig::default())
    }
}

/// Bagged ensemble of [`DecisionTree`]s. Probabilities are the mean of the
/// trees' leaf distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(data: &Dataset, params: &ForestParams) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::training("cannot fit a forest on an empty dataset"));
        }
        if params.n_estimators == 0 {
            return Err(Error::training("n_estimators must be at least 1"));
        }

        let n = data.len();
        let mut seeds = Xoshiro256PlusPlus::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for i in 0..params.n_estimators {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seeds.next_u64());
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let tree = DecisionTree::fit(data, &bootstrap, &params.tree, &mut rng)?;
            debug!(tree = i, nodes = tree.nodes().len(), depth = tree.depth(), "Fitted tree");
            trees.push(tree);
        }

        Ok(Self {
            n_features: N_FEATURES,
            n_classes: data.n_classes,
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.n_features {
            return Err(Error::invalid_input(format!(
                "expected {} features, got {}",
                self.n_features,
                x.len()
            )));
        }
        if let Some(bad) = x.iter().find(|v| !v.is_finite()) {
            return Err(Error::invalid_input(format!("feature value {} is not finite", bad)));
        }
        if self.trees.is_empty() {
            return Err(Error::invalid_model("forest has no trees"));
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(x)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    pub fn predict(&self, x: &[f64]) -> Result<usize> {
        Ok(argmax(&self.predict_proba(x)?))
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::invalid_model("forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|e| Error::invalid_model(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}

/// Index of the largest value; ties go to the lowest index.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

mod iris;

pub use iris::{FEATURE_NAMES, load_iris};

use crate::{Error, Result};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Number of features in one sample.
pub const N_FEATURES: usize = 4;

/// A single row of measurements:
/// `[sepal_length, sepal_width, petal_length, petal_width]` in centimetres.
pub type FeatureVector = [f64; N_FEATURES];

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<usize>,
    pub n_classes: usize,
}

impl Dataset {
    pub fn new(features: Vec<FeatureVector>, targets: Vec<usize>, n_classes: usize) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(Error::dataset(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if let Some(bad) = targets.iter().find(|&&t| t >= n_classes) {
            return Err(Error::dataset(format!(
                "target {} out of range for {} classes",
                bad, n_classes
            )));
        }
        Ok(Self {
            features,
            targets,
            n_classes,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i]).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            n_classes: self.n_classes,
        }
    }

    /// Shuffles the rows with a seeded RNG and splits off
    /// `ceil(len * test_size)` rows as the test part.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(Self, Self)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(Error::dataset(format!(
                "test_size must be between 0 and 1, got {}",
                test_size
            )));
        }

        let n_test = (self.len() as f64 * test_size).ceil() as usize;
        if n_test == 0 || n_test >= self.len() {
            return Err(Error::dataset(format!(
                "cannot split {} samples with test_size {}",
                self.len(),
                test_size
            )));
        }

        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        Ok((self.subset(train_idx), self.subset(test_idx)))
    }

    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &t in &self.targets {
            counts[t] += 1;
        }
        counts
    }
}

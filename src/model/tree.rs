use crate::dataset::Dataset;
use crate::{Error, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per node before settling for the best split found.
    pub max_features: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Samples with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class distribution of the training samples that reached this leaf.
    Leaf { distribution: Vec<f64> },
}

/// CART classification tree grown with the Gini criterion. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct Grower<'a, R> {
    data: &'a Dataset,
    params: &'a TreeParams,
    rng: &'a mut R,
    n_features: usize,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fits a tree on the rows of `data` listed in `sample`. Repeated indices
    /// count once per occurrence, which is how bootstrap samples are weighted.
    pub fn fit<R: Rng>(
        data: &Dataset,
        sample: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Result<Self> {
        if sample.is_empty() {
            return Err(Error::training("cannot fit a tree on zero samples"));
        }
        if let Some(&bad) = sample.iter().find(|&&i| i >= data.len()) {
            return Err(Error::training(format!("sample index {} out of range", bad)));
        }

        let n_features = data.features.first().map_or(0, |f| f.len());
        let mut grower = Grower {
            data,
            params,
            rng,
            n_features,
            nodes: Vec::new(),
        };
        grower.grow(sample.to_vec(), 0);

        Ok(Self {
            nodes: grower.nodes,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Class distribution of the leaf `x` falls into. Callers check the
    /// feature count; see [`DecisionTree::validate`].
    pub fn predict_proba(&self, x: &[f64]) -> &[f64] {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Structural checks for a tree read back from disk.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::invalid_model("tree has no nodes"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::invalid_model(format!(
                            "node {} splits on feature {} of {}",
                            i, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::invalid_model(format!("node {} has a non-finite threshold", i)));
                    }
                    // Children are always created after their parent, which rules out cycles.
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(Error::invalid_model(format!(
                                "node {} points to invalid child {}",
                                i, child
                            )));
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(Error::invalid_model(format!(
                            "leaf {} has {} classes, expected {}",
                            i,
                            distribution.len(),
                            n_classes
                        )));
                    }
                    let sum: f64 = distribution.iter().sum();
                    let negative = distribution.iter().any(|&p| p.is_nan() || p < 0.0);
                    if negative || (sum - 1.0).abs() > 1e-6 {
                        return Err(Error::invalid_model(format!(
                            "leaf {} is not a probability distribution",
                            i
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl<R: Rng> Grower<'_, R> {
    fn grow(&mut self, sample: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&sample);
        let id = self.nodes.len();
        self.nodes.push(leaf(&counts, sample.len()));

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if pure || depth_reached || sample.len() < self.params.min_samples_split {
            return id;
        }

        let Some(split) = self.best_split(&sample, &counts) else {
            return id;
        };

        let (left_sample, right_sample): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&row| self.data.features[row][split.feature] <= split.threshold);

        let left = self.grow(left_sample, depth + 1);
        let right = self.grow(right_sample, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn class_counts(&self, sample: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.data.n_classes];
        for &row in sample {
            counts[self.data.targets[row]] += 1;
        }
        counts
    }

    /// Tries features in random order. Once `max_features` have been looked at
    /// the search stops, unless none of them could split the node.
    fn best_split(&mut self, sample: &[usize], counts: &[usize]) -> Option<BestSplit> {
        let mut order: Vec<usize> = (0..self.n_features).collect();
        order.shuffle(&mut *self.rng);

        let mut best: Option<BestSplit> = None;
        for (tried, &feature) in order.iter().enumerate() {
            if tried >= self.params.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(feature, sample, counts) {
                if best.is_none_or(|b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(&self, feature: usize, sample: &[usize], counts: &[usize]) -> Option<BestSplit> {
        let mut sorted: Vec<(f64, usize)> = sample
            .iter()
            .map(|&row| (self.data.features[row][feature], self.data.targets[row]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = sorted.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut left = vec![0usize; counts.len()];
        let mut right = counts.to_vec();
        let mut best: Option<BestSplit> = None;

        for i in 0..n - 1 {
            let (value, class) = sorted[i];
            left[class] += 1;
            right[class] -= 1;

            let next = sorted[i + 1].0;
            if next <= value {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right))
                / n as f64;
            if best.is_none_or(|b| impurity < b.impurity) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf(counts: &[usize], total: usize) -> Node {
    let total = total.max(1) as f64;
    Node::Leaf {
        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
    }
}

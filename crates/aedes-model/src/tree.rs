//! Variance-reduction regression tree.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Hyperparameters for a single regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth.
    pub max_depth: usize,
    /// Minimum rows required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum rows in each child.
    pub min_samples_leaf: usize,
    /// Feature columns considered per split (`None` = all).
    pub max_features: Option<usize>,
    /// Seed for the feature-subset shuffle.
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 1,
            max_features: None,
            seed: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    feature_idx: Option<usize>,
    threshold: Option<f64>,
    value: f64,
    n_samples: usize,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    const fn leaf(value: f64, n_samples: usize) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            value,
            n_samples,
            left: None,
            right: None,
        }
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<Node>,
    feature_importances: Vec<f64>,
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    importance: f64,
}

impl RegressionTree {
    /// Create an unfitted tree.
    pub const fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    /// Fit the tree on a dataset.
    pub fn fit(&mut self, dataset: &Dataset) {
        let n_features = dataset.n_features();
        self.feature_importances = vec![0.0; n_features];

        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build(dataset, &indices, 0, &mut rng));

        // Normalize this tree's importance mass; the forest re-normalizes
        // across trees.
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for importance in &mut self.feature_importances {
                *importance /= sum;
            }
        }
    }

    fn build(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let labels: Vec<f64> = indices.iter().map(|&i| dataset.labels[i]).collect();
        let impurity = variance(&labels);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-10
        {
            return Node::leaf(mean(&labels), indices.len());
        }

        let Some(split) = self.find_best_split(dataset, indices, impurity, rng) else {
            return Node::leaf(mean(&labels), indices.len());
        };

        if split.left.len() < self.config.min_samples_leaf
            || split.right.len() < self.config.min_samples_leaf
        {
            return Node::leaf(mean(&labels), indices.len());
        }

        self.feature_importances[split.feature_idx] += split.importance;

        let left = self.build(dataset, &split.left, depth + 1, rng);
        let right = self.build(dataset, &split.right, depth + 1, rng);

        Node {
            feature_idx: Some(split.feature_idx),
            threshold: Some(split.threshold),
            value: mean(&labels),
            n_samples: indices.len(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n_features = dataset.n_features();
        let max_features = self.config.max_features.unwrap_or(n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);
        // Stable split choice among equal-gain candidates.
        feature_indices.sort_unstable();

        let mut best_gain = 0.0;
        let mut best: Option<BestSplit> = None;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| dataset.features[i][feature_idx])
                .collect();
            values.sort_by(f64::total_cmp);
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| dataset.features[i][feature_idx] <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_labels: Vec<f64> = left.iter().map(|&i| dataset.labels[i]).collect();
                let right_labels: Vec<f64> = right.iter().map(|&i| dataset.labels[i]).collect();

                let n_left = left.len() as f64;
                let n_right = right.len() as f64;
                let weighted = (n_left * variance(&left_labels)
                    + n_right * variance(&right_labels))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some(BestSplit {
                        feature_idx,
                        threshold,
                        left,
                        right,
                        importance: gain * indices.len() as f64,
                    });
                }
            }
        }

        best
    }

    /// Predict one sample.
    pub fn predict_one(&self, sample: &[f64]) -> f64 {
        let Some(mut node) = self.root.as_ref() else {
            return 0.0;
        };
        loop {
            match (node.feature_idx, node.threshold, &node.left, &node.right) {
                (Some(feature), Some(threshold), Some(left), Some(right)) => {
                    node = if sample[feature] <= threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
                _ => return node.value,
            }
        }
    }

    /// Per-feature importance mass of this tree, normalized to sum 1.0
    /// when any split happened.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

//! Bagged ensemble of regression trees.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::tree::{RegressionTree, TreeConfig};

/// Hyperparameters for the bagged forest.
///
/// Defaults pin the published model: 250 trees, depth 15, minimum split
/// of 5, base seed 2. Changing any of these changes every exported
/// importance ranking, so they travel through configuration, never
/// ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of bagged trees.
    pub n_trees: usize,
    /// Maximum depth per tree.
    pub max_depth: usize,
    /// Minimum rows required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum rows in each child.
    pub min_samples_leaf: usize,
    /// Feature columns considered per split (`None` = all).
    pub max_features: Option<usize>,
    /// Base seed; tree *i* uses `seed + i`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 250,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 1,
            max_features: None,
            seed: 2,
        }
    }
}

/// A fitted bagged forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Create an unfitted forest.
    pub const fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Fit every tree on its own bootstrap sample.
    ///
    /// Trees are independent and fit in parallel; determinism holds
    /// because tree *i* is seeded with `seed + i` regardless of
    /// scheduling order.
    pub fn fit(&mut self, dataset: &Dataset) {
        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();

        let trees: Vec<RegressionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = self.config.seed.wrapping_add(i as u64);
                let mut tree = RegressionTree::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: self.config.max_features,
                    seed: tree_seed,
                });
                tree.fit(&dataset.bootstrap_sample(tree_seed));
                tree
            })
            .collect();
        self.trees = trees;

        let mut importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (slot, importance) in importances.iter_mut().zip(tree.feature_importances()) {
                *slot += importance;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for importance in &mut importances {
                *importance /= sum;
            }
        }
        self.feature_importances = importances;
    }

    /// Predict one sample as the tree average.
    pub fn predict_one(&self, sample: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(sample)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict every row of a dataset.
    pub fn predict(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .features
            .par_iter()
            .map(|row| self.predict_one(row))
            .collect()
    }

    /// Coefficient of determination on a dataset.
    pub fn r2_score(&self, dataset: &Dataset) -> f64 {
        let n = dataset.n_samples();
        if n == 0 {
            return 0.0;
        }
        let predictions = self.predict(dataset);
        let mean_label = dataset.labels.iter().sum::<f64>() / n as f64;

        let ss_res: f64 = predictions
            .iter()
            .zip(&dataset.labels)
            .map(|(p, l)| (l - p).powi(2))
            .sum();
        let ss_tot: f64 = dataset
            .labels
            .iter()
            .map(|l| (l - mean_label).powi(2))
            .sum();

        if ss_tot == 0.0 {
            0.0
        } else {
            1.0 - ss_res / ss_tot
        }
    }

    /// Normalized per-feature importances (sum 1.0 when any tree split).
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature column names seen at fit time.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

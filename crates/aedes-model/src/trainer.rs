//! Per-partition training and importance ranking.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{ModelError, Result};
use crate::forest::{ForestConfig, RandomForest};

/// Smallest row count a partition may train on by default: one
/// region-year of monthly observations.
pub const DEFAULT_MIN_PARTITION_ROWS: usize = 12;

/// Allowed deviation of the importance sum from 1.0.
pub const IMPORTANCE_TOLERANCE: f64 = 1e-6;

/// A disjoint training scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Partition {
    /// The whole panel, all years pooled.
    AllYears,
    /// One calendar year.
    Year(i32),
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllYears => write!(f, "all"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Knobs for per-partition training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Forest hyperparameters.
    pub forest: ForestConfig,
    /// Held-out fraction of each partition.
    pub test_ratio: f64,
    /// Seed for the train/test shuffle.
    pub split_seed: u64,
    /// Partitions with fewer rows are rejected, not trained.
    pub min_partition_rows: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            test_ratio: 0.2,
            split_seed: 42,
            min_partition_rows: DEFAULT_MIN_PARTITION_ROWS,
        }
    }
}

/// One feature's share of the model's importance mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature column name.
    pub name: String,
    /// Normalized importance in [0, 1].
    pub importance: f64,
}

/// A fitted model scoped to one partition.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    /// Scope this model was trained on.
    pub partition: Partition,
    /// Importances ranked descending, ties broken by name ascending.
    pub importance: Vec<FeatureImportance>,
    /// Fit on the training subset.
    pub train_r2: f64,
    /// Fit on the held-out subset.
    pub test_r2: f64,
    /// Rows the partition contributed.
    pub n_samples: usize,
    forest: RandomForest,
}

impl TrainedModel {
    /// Predict one sample with the fitted forest.
    pub fn predict_one(&self, sample: &[f64]) -> f64 {
        self.forest.predict_one(sample)
    }

    /// Feature column names seen at fit time.
    pub fn feature_names(&self) -> &[String] {
        self.forest.feature_names()
    }

    /// The top `n` features by ranked importance.
    pub fn top_factors(&self, n: usize) -> &[FeatureImportance] {
        &self.importance[..n.min(self.importance.len())]
    }
}

/// Rank importances descending, breaking exact ties by feature name in
/// ascending lexical order. The tie-break is part of the artifact
/// contract, not an implementation accident.
pub fn rank_importances(names: &[String], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            name: name.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}

/// Train one partition: seeded split, bagged fit, ranked importances.
///
/// # Errors
///
/// [`ModelError::InsufficientData`] when the partition is smaller than
/// the configured minimum; [`ModelError::ImportanceSum`] when the fitted
/// importances fail the sum-to-one invariant.
pub fn train_partition(
    dataset: &Dataset,
    partition: Partition,
    config: &TrainerConfig,
) -> Result<TrainedModel> {
    let rows = dataset.n_samples();
    if rows < config.min_partition_rows {
        return Err(ModelError::InsufficientData {
            partition: partition.to_string(),
            rows,
            min_rows: config.min_partition_rows,
        });
    }

    let split = dataset.random_split(config.test_ratio, config.split_seed);

    let mut forest = RandomForest::new(config.forest.clone());
    forest.fit(&split.train);

    let train_r2 = forest.r2_score(&split.train);
    let test_r2 = if split.test.n_samples() == 0 {
        train_r2
    } else {
        forest.r2_score(&split.test)
    };

    let importance = rank_importances(forest.feature_names(), forest.feature_importances());
    let sum: f64 = importance.iter().map(|f| f.importance).sum();
    if (sum - 1.0).abs() > IMPORTANCE_TOLERANCE {
        return Err(ModelError::ImportanceSum {
            partition: partition.to_string(),
            sum,
        });
    }

    Ok(TrainedModel {
        partition,
        importance,
        train_r2,
        test_r2,
        n_samples: rows,
        forest,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn dataset(rows: usize) -> Dataset {
        let mut dataset = Dataset::new(vec![
            "rain".to_string(),
            "density".to_string(),
            "noise".to_string(),
        ]);
        for i in 0..rows {
            let rain = (i % 17) as f64 * 10.0;
            let density = 500.0 + (i % 5) as f64;
            // Cases driven almost entirely by rainfall.
            dataset.add_sample(vec![rain, density, 1.0], rain * 2.0 + (i % 3) as f64);
        }
        dataset
    }

    fn quick_config() -> TrainerConfig {
        TrainerConfig {
            forest: ForestConfig {
                n_trees: 15,
                max_depth: 8,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn trains_and_ranks_the_driving_factor_first() {
        let model = train_partition(&dataset(120), Partition::Year(2020), &quick_config()).unwrap();
        assert_eq!(model.partition, Partition::Year(2020));
        assert_eq!(model.importance[0].name, "rain");
        assert!(model.train_r2 > 0.9);
    }

    #[test]
    fn importances_sum_to_one() {
        let model = train_partition(&dataset(120), Partition::AllYears, &quick_config()).unwrap();
        let sum: f64 = model.importance.iter().map(|f| f.importance).sum();
        assert!((sum - 1.0).abs() <= IMPORTANCE_TOLERANCE);
    }

    #[test]
    fn training_is_reproducible() {
        let data = dataset(120);
        let a = train_partition(&data, Partition::AllYears, &quick_config()).unwrap();
        let b = train_partition(&data, Partition::AllYears, &quick_config()).unwrap();
        assert_eq!(a.importance, b.importance);
        assert_eq!(a.train_r2, b.train_r2);
        assert_eq!(a.test_r2, b.test_r2);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(11)]
    fn small_partitions_are_rejected(#[case] rows: usize) {
        let err = train_partition(&dataset(rows), Partition::Year(2019), &quick_config())
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::InsufficientData { rows: r, min_rows: 12, .. } if r == rows
        ));
    }

    #[test]
    fn ties_break_on_feature_name() {
        let ranked = rank_importances(
            &[
                "kepadatan_penduduk".to_string(),
                "bulan".to_string(),
                "jumlah_curah_hujan".to_string(),
            ],
            &[0.25, 0.5, 0.25],
        );
        assert_eq!(ranked[0].name, "bulan");
        // Equal importances order lexically.
        assert_eq!(ranked[1].name, "jumlah_curah_hujan");
        assert_eq!(ranked[2].name, "kepadatan_penduduk");
    }

    #[test]
    fn partition_display_is_stable() {
        assert_eq!(Partition::AllYears.to_string(), "all");
        assert_eq!(Partition::Year(2021).to_string(), "2021");
    }
}

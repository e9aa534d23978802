//! Training matrix extracted from the engineered feature frame.

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Row-major feature matrix plus labels for one training partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature matrix, one row per observation.
    pub features: Vec<Vec<f64>>,
    /// Target values (monthly case counts).
    pub labels: Vec<f64>,
    /// Column names, aligned with each row.
    pub feature_names: Vec<String>,
}

/// A train/test partition of a dataset.
#[derive(Debug)]
pub struct Split {
    /// Training subset.
    pub train: Dataset,
    /// Held-out subset.
    pub test: Dataset,
}

impl Dataset {
    /// Create an empty dataset with the given columns.
    pub const fn new(feature_names: Vec<String>) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            feature_names,
        }
    }

    /// Number of rows.
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Append one row.
    pub fn add_sample(&mut self, features: Vec<f64>, label: f64) {
        debug_assert_eq!(features.len(), self.feature_names.len());
        self.features.push(features);
        self.labels.push(label);
    }

    /// Materialize a dataset from the engineered frame.
    ///
    /// Feature cells may be null (the lag feature is null at each region's
    /// first month); nulls are imputed with the column median over this
    /// partition, matching the published model. Null labels are an error.
    pub fn from_frame(
        frame: &DataFrame,
        feature_columns: &[String],
        label_column: &str,
    ) -> Result<Self> {
        let n = frame.height();

        let mut columns = Vec::with_capacity(feature_columns.len());
        for name in feature_columns {
            let column = frame
                .column(name)
                .map_err(|_| ModelError::MissingFeature {
                    column: name.clone(),
                })?
                .cast(&DataType::Float64)?;
            columns.push(column);
        }

        let mut matrix: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
        for column in &columns {
            let values = column.f64()?;
            matrix.push((0..n).map(|i| values.get(i)).collect());
        }

        // Median imputation per column.
        let mut features = vec![vec![0.0; feature_columns.len()]; n];
        for (j, cells) in matrix.iter().enumerate() {
            let mut present: Vec<f64> = cells.iter().flatten().copied().collect();
            let fill = median(&mut present);
            for (i, cell) in cells.iter().enumerate() {
                features[i][j] = cell.unwrap_or(fill);
            }
        }

        let labels_column = frame
            .column(label_column)
            .map_err(|_| ModelError::MissingFeature {
                column: label_column.to_string(),
            })?
            .cast(&DataType::Float64)?;
        let labels_values = labels_column.f64()?;
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            labels.push(labels_values.get(i).ok_or_else(|| ModelError::MissingValue {
                column: label_column.to_string(),
            })?);
        }

        Ok(Self {
            features,
            labels,
            feature_names: feature_columns.to_vec(),
        })
    }

    /// Select rows by index.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Bootstrap sample with replacement, seeded.
    pub fn bootstrap_sample(&self, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();
        let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        self.subset(&indices)
    }

    /// Seeded shuffle split into train and held-out sets.
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> Split {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let test_size = (test_ratio * n as f64) as usize;
        let (test_indices, train_indices) = indices.split_at(test_size);

        Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        }
    }
}

/// Median of a slice; 0.0 when empty. Sorts in place.
fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn split_sizes_honor_the_ratio() {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..10 {
            dataset.add_sample(vec![i as f64], i as f64);
        }

        let split = dataset.random_split(0.2, 42);
        assert_eq!(split.test.n_samples(), 2);
        assert_eq!(split.train.n_samples(), 8);
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..20 {
            dataset.add_sample(vec![i as f64], i as f64);
        }

        let a = dataset.random_split(0.25, 7);
        let b = dataset.random_split(0.25, 7);
        assert_eq!(a.train.labels, b.train.labels);
        assert_eq!(a.test.labels, b.test.labels);
    }

    #[test]
    fn from_frame_imputes_nulls_with_the_column_median() {
        let df = DataFrame::new(vec![
            Series::new("x".into(), vec![Some(1.0), None, Some(3.0), Some(10.0)]).into(),
            Series::new("y".into(), vec![5.0, 6.0, 7.0, 8.0]).into(),
        ])
        .unwrap();

        let dataset =
            Dataset::from_frame(&df, &["x".to_string()], "y").unwrap();
        // Median of {1, 3, 10} is 3.
        assert_relative_eq!(dataset.features[1][0], 3.0);
        assert_eq!(dataset.labels, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn from_frame_rejects_unknown_columns() {
        let df = DataFrame::new(vec![Series::new("x".into(), vec![1.0]).into()]).unwrap();
        let err = Dataset::from_frame(&df, &["missing".to_string()], "x").unwrap_err();
        assert!(matches!(err, ModelError::MissingFeature { .. }));
    }

    #[test]
    fn bootstrap_is_seeded() {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..30 {
            dataset.add_sample(vec![i as f64], i as f64);
        }
        let a = dataset.bootstrap_sample(3);
        let b = dataset.bootstrap_sample(3);
        assert_eq!(a.labels, b.labels);
    }
}

//! Ordered application of the engineered feature set.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use aedes_data::schema::{COL_DENSITY, COL_MONTH, COL_RAINFALL};

use crate::error::{FeatureError, Result};
use crate::interaction::RainDensityInteraction;
use crate::lag::{LagConfig, RainfallLag};
use crate::rolling::{RainfallRollingMean, RollingConfig};
use crate::Feature;

/// Knobs for the engineered feature set, passed in explicitly; stages
/// never read ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Months of rainfall lag (default: 1).
    pub lag_periods: usize,
    /// Trailing rolling-mean window in months (default: 3).
    pub rolling_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lag_periods: 1,
            rolling_window: 3,
        }
    }
}

/// Applies the engineered features to a panel frame in a fixed order.
#[derive(Debug)]
pub struct FeatureEngineer {
    features: Vec<Box<dyn Feature + Send + Sync>>,
    feature_columns: Vec<String>,
}

impl FeatureEngineer {
    /// Build the engineer from a configuration.
    pub fn new(config: &FeatureConfig) -> Self {
        let lag = RainfallLag::with_config(LagConfig {
            periods: config.lag_periods,
        });
        let rolling = RainfallRollingMean::with_config(RollingConfig {
            window: config.rolling_window,
        });
        let interaction = RainDensityInteraction;

        // Candidate feature columns for the trainer, in the order the
        // published model expects them.
        let feature_columns = vec![
            COL_RAINFALL.to_string(),
            lag.name().to_string(),
            rolling.name().to_string(),
            COL_DENSITY.to_string(),
            interaction.name().to_string(),
            COL_MONTH.to_string(),
        ];

        Self {
            features: vec![Box::new(lag), Box::new(rolling), Box::new(interaction)],
            feature_columns,
        }
    }

    /// The full candidate feature column list fed to the trainer.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Derive every engineered column over the panel frame.
    ///
    /// The input must carry the loader's source columns; the output is the
    /// same frame extended with one column per feature.
    pub fn apply(&self, panel: DataFrame) -> Result<DataFrame> {
        for feature in &self.features {
            for column in feature.required_columns() {
                if panel.column(column).is_err() {
                    return Err(FeatureError::MissingColumn {
                        feature: feature.name().to_string(),
                        column: (*column).to_string(),
                    });
                }
            }
        }

        let mut frame = panel.lazy();
        for feature in &self.features {
            frame = feature.compute(frame)?;
        }
        Ok(frame.collect()?)
    }
}

#[cfg(test)]
mod tests {
    use aedes_data::schema::{COL_REGION, COL_YEAR};

    use super::*;

    fn panel_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new(COL_REGION.into(), vec!["Bandung", "Bandung", "Bandung"]).into(),
            Series::new(COL_YEAR.into(), vec![2020, 2020, 2020]).into(),
            Series::new(COL_MONTH.into(), vec![1, 2, 3]).into(),
            Series::new(COL_RAINFALL.into(), vec![10.0, 20.0, 30.0]).into(),
            Series::new(COL_DENSITY.into(), vec![100.0, 100.0, 100.0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn derives_every_configured_column() {
        let engineer = FeatureEngineer::new(&FeatureConfig::default());
        let out = engineer.apply(panel_frame()).unwrap();
        for column in ["rain_lag1", "rain_3m_mean", "rain_x_density"] {
            assert!(out.column(column).is_ok(), "missing {column}");
        }
        assert_eq!(
            engineer.feature_columns(),
            &[
                "jumlah_curah_hujan",
                "rain_lag1",
                "rain_3m_mean",
                "kepadatan_penduduk",
                "rain_x_density",
                "bulan",
            ]
        );
    }

    #[test]
    fn missing_input_column_is_reported() {
        let df = DataFrame::new(vec![
            Series::new(COL_REGION.into(), vec!["Bandung"]).into(),
            Series::new(COL_YEAR.into(), vec![2020]).into(),
            Series::new(COL_MONTH.into(), vec![1]).into(),
        ])
        .unwrap();

        let engineer = FeatureEngineer::new(&FeatureConfig::default());
        let err = engineer.apply(df).unwrap_err();
        assert!(matches!(err, FeatureError::MissingColumn { .. }));
    }

    #[test]
    fn window_size_is_reflected_in_column_names() {
        let engineer = FeatureEngineer::new(&FeatureConfig {
            lag_periods: 2,
            rolling_window: 6,
        });
        assert!(engineer
            .feature_columns()
            .iter()
            .any(|c| c == "rain_lag2"));
        assert!(engineer
            .feature_columns()
            .iter()
            .any(|c| c == "rain_6m_mean"));
    }
}

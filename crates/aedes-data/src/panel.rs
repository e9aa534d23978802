//! The validated observation panel.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::schema;

/// One (region, year, month) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Province the district belongs to.
    pub province: String,
    /// District / city name (the region key).
    pub region: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1..=12.
    pub month: u32,
    /// Reported cases in this month.
    pub monthly_cases: u32,
    /// Reported cases for the whole year.
    pub annual_cases: u32,
    /// Monthly rainfall in millimetres.
    pub rainfall_mm: f64,
    /// Population density per square kilometre.
    pub population_density: f64,
}

impl Observation {
    /// The unique key of this observation.
    pub fn key(&self) -> (&str, i32, u32) {
        (self.region.as_str(), self.year, self.month)
    }
}

/// The full ordered set of region/time observations.
///
/// Construction validates the two structural invariants the rest of the
/// pipeline relies on: keys are unique, and within each observed
/// (region, year) the monthly series is contiguous. Whole years may be
/// absent for a region; holes inside a year may not.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    observations: Vec<Observation>,
}

impl Panel {
    /// Build a panel from raw observations, sorting and validating them.
    pub fn from_observations(mut observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(DataError::EmptyDataset);
        }

        observations.sort_by(|a, b| {
            a.region
                .cmp(&b.region)
                .then(a.year.cmp(&b.year))
                .then(a.month.cmp(&b.month))
        });

        for pair in observations.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.key() == next.key() {
                return Err(DataError::DuplicateKey {
                    region: next.region.clone(),
                    year: next.year,
                    month: next.month,
                });
            }
            // Contiguity inside one region-year block.
            if prev.region == next.region
                && prev.year == next.year
                && next.month != prev.month + 1
            {
                return Err(DataError::SeriesGap {
                    region: next.region.clone(),
                    year: next.year,
                    month: prev.month + 1,
                });
            }
        }

        Ok(Self { observations })
    }

    /// All observations, sorted by (region, year, month).
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the panel is empty. Never true for a constructed panel.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.observations.iter().map(|o| o.year).collect();
        years.into_iter().collect()
    }

    /// Distinct region names, ascending.
    pub fn regions(&self) -> Vec<String> {
        let regions: BTreeSet<&str> =
            self.observations.iter().map(|o| o.region.as_str()).collect();
        regions.into_iter().map(str::to_owned).collect()
    }

    /// Distinct province names, ascending.
    pub fn provinces(&self) -> Vec<String> {
        let provinces: BTreeSet<&str> = self
            .observations
            .iter()
            .map(|o| o.province.as_str())
            .collect();
        provinces.into_iter().map(str::to_owned).collect()
    }

    /// The realized (region, year) key space, ascending.
    pub fn region_years(&self) -> BTreeSet<(String, i32)> {
        self.observations
            .iter()
            .map(|o| (o.region.clone(), o.year))
            .collect()
    }

    /// Regions observed in a given year, ascending.
    pub fn regions_in_year(&self, year: i32) -> Vec<String> {
        let regions: BTreeSet<&str> = self
            .observations
            .iter()
            .filter(|o| o.year == year)
            .map(|o| o.region.as_str())
            .collect();
        regions.into_iter().map(str::to_owned).collect()
    }

    /// Observations of one year, in panel order.
    pub fn for_year(&self, year: i32) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(move |o| o.year == year)
    }

    /// Observations of one region, in time order.
    pub fn for_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a Observation> {
        self.observations.iter().filter(move |o| o.region == region)
    }

    /// Bridge the panel into a polars DataFrame for feature engineering.
    ///
    /// Columns carry the source header names so engineered feature names
    /// line up with the vocabulary the artifacts expose.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let n = self.observations.len();
        let mut years = Vec::with_capacity(n);
        let mut months = Vec::with_capacity(n);
        let mut provinces = Vec::with_capacity(n);
        let mut regions = Vec::with_capacity(n);
        let mut monthly_cases = Vec::with_capacity(n);
        let mut annual_cases = Vec::with_capacity(n);
        let mut rainfall = Vec::with_capacity(n);
        let mut density = Vec::with_capacity(n);

        for obs in &self.observations {
            years.push(obs.year);
            months.push(obs.month as i32);
            provinces.push(obs.province.clone());
            regions.push(obs.region.clone());
            monthly_cases.push(obs.monthly_cases as i64);
            annual_cases.push(obs.annual_cases as i64);
            rainfall.push(obs.rainfall_mm);
            density.push(obs.population_density);
        }

        let df = DataFrame::new(vec![
            Series::new(schema::COL_YEAR.into(), years).into(),
            Series::new(schema::COL_MONTH.into(), months).into(),
            Series::new(schema::COL_PROVINCE.into(), provinces).into(),
            Series::new(schema::COL_REGION.into(), regions).into(),
            Series::new(schema::COL_MONTHLY_CASES.into(), monthly_cases).into(),
            Series::new(schema::COL_ANNUAL_CASES.into(), annual_cases).into(),
            Series::new(schema::COL_RAINFALL.into(), rainfall).into(),
            Series::new(schema::COL_DENSITY.into(), density).into(),
        ])?;

        Ok(df)
    }
}

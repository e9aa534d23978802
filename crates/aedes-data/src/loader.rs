//! CSV ingestion for the combined DBD dataset.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::panel::{Observation, Panel};
use crate::schema;

/// Load a panel from a CSV file on disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Panel> {
    let file = std::fs::File::open(path)?;
    load_reader(file)
}

/// Load a panel from any CSV reader.
///
/// The header must contain every column in
/// [`schema::REQUIRED_COLUMNS`]; extra columns are ignored. Parsing is
/// all-or-nothing: the first malformed row aborts the load.
pub fn load_reader<R: Read>(reader: R) -> Result<Panel> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        index.entry(name).or_insert(i);
    }
    let mut columns = [0usize; schema::REQUIRED_COLUMNS.len()];
    for (slot, column) in columns.iter_mut().zip(schema::REQUIRED_COLUMNS) {
        *slot = *index.get(column).ok_or_else(|| DataError::MissingColumn {
            column: column.to_string(),
        })?;
    }
    let [year_at, month_at, province_at, region_at, monthly_at, annual_at, rainfall_at, density_at] =
        columns;

    let mut observations = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let record = record?;
        // Header occupies line 1.
        let line = row as u64 + 2;

        let year = parse_int(&record, year_at, schema::COL_YEAR, line)?;
        if !schema::YEAR_RANGE.contains(&year) {
            return Err(DataError::YearOutOfRange { year, line });
        }
        let month = parse_int(&record, month_at, schema::COL_MONTH, line)?;
        if !(1..=12).contains(&month) {
            return Err(DataError::MonthOutOfRange { month, line });
        }

        let monthly_cases = parse_count(&record, monthly_at, schema::COL_MONTHLY_CASES, line)?;
        let annual_cases = parse_count(&record, annual_at, schema::COL_ANNUAL_CASES, line)?;
        let rainfall_mm = parse_non_negative(&record, rainfall_at, schema::COL_RAINFALL, line)?;
        let population_density =
            parse_non_negative(&record, density_at, schema::COL_DENSITY, line)?;

        observations.push(Observation {
            province: field(&record, province_at).to_string(),
            region: field(&record, region_at).to_string(),
            year: year as i32,
            month: month as u32,
            monthly_cases,
            annual_cases,
            rainfall_mm,
            population_density,
        });
    }

    let panel = Panel::from_observations(observations)?;
    log::info!(
        "loaded panel: {} observations, {} regions, {} years",
        panel.len(),
        panel.regions().len(),
        panel.years().len()
    );
    Ok(panel)
}

fn field<'r>(record: &'r csv::StringRecord, at: usize) -> &'r str {
    record.get(at).unwrap_or_default()
}

fn parse_int(record: &csv::StringRecord, at: usize, column: &str, line: u64) -> Result<i64> {
    let raw = field(record, at);
    raw.parse::<i64>().map_err(|_| DataError::NonNumeric {
        column: column.to_string(),
        value: raw.to_string(),
        line,
    })
}

fn parse_count(record: &csv::StringRecord, at: usize, column: &str, line: u64) -> Result<u32> {
    let value = parse_int(record, at, column, line)?;
    u32::try_from(value).map_err(|_| DataError::NegativeValue {
        column: column.to_string(),
        value: value as f64,
        line,
    })
}

fn parse_non_negative(
    record: &csv::StringRecord,
    at: usize,
    column: &str,
    line: u64,
) -> Result<f64> {
    let raw = field(record, at);
    let value: f64 = raw.parse().map_err(|_| DataError::NonNumeric {
        column: column.to_string(),
        value: raw.to_string(),
        line,
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(DataError::NegativeValue {
            column: column.to_string(),
            value,
            line,
        });
    }
    Ok(value)
}

//! Column names and display vocabulary of the reference dataset.
//!
//! The combined DBD dataset ships with Indonesian column headers; they are
//! the wire format every consumer of this pipeline already speaks, so they
//! are kept verbatim rather than translated.

/// Year column (`i32`).
pub const COL_YEAR: &str = "tahun";
/// Month column (1..=12).
pub const COL_MONTH: &str = "bulan";
/// Province name column.
pub const COL_PROVINCE: &str = "nama_provinsi";
/// District / city (region) name column.
pub const COL_REGION: &str = "nama_kabupaten_kota";
/// Monthly case count column.
pub const COL_MONTHLY_CASES: &str = "kasus_bulanan";
/// Annual case total column.
pub const COL_ANNUAL_CASES: &str = "kasus_tahunan";
/// Monthly rainfall column (mm).
pub const COL_RAINFALL: &str = "jumlah_curah_hujan";
/// Population density column (per km²).
pub const COL_DENSITY: &str = "kepadatan_penduduk";

/// Every column the loader requires, in source order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_YEAR,
    COL_MONTH,
    COL_PROVINCE,
    COL_REGION,
    COL_MONTHLY_CASES,
    COL_ANNUAL_CASES,
    COL_RAINFALL,
    COL_DENSITY,
];

/// Accepted year range. Wide on purpose: the reference dataset covers
/// 2016-2024 but the pipeline must not hardcode that span.
pub const YEAR_RANGE: std::ops::RangeInclusive<i64> = 1900..=2100;

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

// Abbreviations as the upstream dataset publishes them, including the
// English-looking "Oct".
const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Oct", "Nov", "Des",
];

/// Full Indonesian month name for a 1-based month.
///
/// Returns `None` for months outside 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Abbreviated month name for a 1-based month.
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    MONTH_ABBREVS.get(month.checked_sub(1)? as usize).copied()
}

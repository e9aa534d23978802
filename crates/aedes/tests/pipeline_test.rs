//! End-to-end pipeline tests over a synthetic two-region panel.
//!
//! The panel: region "Kota Alpha" observed in 2020 and 2021, region
//! "Kota Beta Raya" observed in 2020 only, three months per year.
//! Rainfall is constant and cases depend only on population density, so
//! the density factor must dominate every importance ranking.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use aedes::model::{ForestConfig, TrainerConfig};
use aedes::pipeline::{run, PipelineConfig};

const HEADER: &str = "tahun,bulan,nama_provinsi,nama_kabupaten_kota,kasus_bulanan,kasus_tahunan,jumlah_curah_hujan,kepadatan_penduduk";

/// Alpha: 10 cases/month in 2020 and a month-driven 15/20/25 in 2021.
/// Beta: 50 cases/month in 2020, absent in 2021. Rainfall is constant,
/// so only density (across regions) and month (within 2021) carry
/// signal.
fn synthetic_csv() -> String {
    let mut rows = vec![HEADER.to_string()];
    for month in 1..=3u32 {
        rows.push(format!(
            "2020,{month},Jawa Barat,Kota Alpha,10,30,150.0,1000.0"
        ));
        rows.push(format!(
            "2020,{month},Jawa Barat,Kota Beta Raya,50,150,150.0,4000.0"
        ));
        rows.push(format!(
            "2021,{month},Jawa Barat,Kota Alpha,{},60,150.0,1000.0",
            10 + month * 5
        ));
    }
    rows.join("\n")
}

fn workspace(name: &str) -> (PathBuf, PathBuf) {
    let base = std::env::temp_dir().join(format!("aedes-e2e-{name}-{}", std::process::id()));
    fs::create_dir_all(&base).unwrap();
    let csv = base.join("panel.csv");
    fs::write(&csv, synthetic_csv()).unwrap();
    (csv, base.join("api"))
}

/// Small forest, splitting allowed on tiny partitions.
fn quick_config(min_partition_rows: usize) -> PipelineConfig {
    PipelineConfig {
        trainer: TrainerConfig {
            forest: ForestConfig {
                n_trees: 25,
                max_depth: 8,
                min_samples_split: 2,
                ..Default::default()
            },
            min_partition_rows,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn read_json(dir: &Path, address: &str) -> serde_json::Value {
    let bytes = fs::read(dir.join(address))
        .unwrap_or_else(|_| panic!("missing artifact {address}"));
    serde_json::from_slice(&bytes).unwrap()
}

fn json_addresses(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json"))
        .collect()
}

#[test]
fn end_to_end_totals_and_top_factor() {
    let (csv, out) = workspace("totals");
    let summary = run(&csv, &out, &quick_config(3)).unwrap();

    assert_eq!(summary.observations, 9);
    assert_eq!(summary.regions, 2);
    assert_eq!(summary.years, vec![2020, 2021]);
    assert!(summary.partitions_skipped.is_empty());

    // Region-year totals equal the hand-summed monthly values.
    let regional = read_json(&out, "regional-data-year2020.json");
    let regions = regional.as_array().unwrap();
    assert_eq!(regions[0]["region"], "Kota Alpha");
    assert_eq!(regions[0]["total_cases"], 30);
    assert_eq!(regions[1]["region"], "Kota Beta Raya");
    assert_eq!(regions[1]["total_cases"], 150);

    // Month 1 of 2020 pools both regions.
    let monthly = read_json(&out, "monthly-results-year2020.json");
    let january = &monthly.as_array().unwrap()[0];
    assert_eq!(january["month"], "Januari");
    assert_eq!(january["total_cases"], 60);

    // Cases were constructed to follow density alone.
    assert_eq!(january["most_influential_factor"], "Kepadatan Penduduk");

    fs::remove_dir_all(out.parent().unwrap()).ok();
}

#[test]
fn importances_sum_to_one_in_every_exported_summary() {
    let (csv, out) = workspace("importance");
    run(&csv, &out, &quick_config(3)).unwrap();

    let summary = read_json(&out, "factor-summary.json");
    let sum: f64 = summary["factors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["avg_importance"].as_f64().unwrap())
        .sum();
    assert!((sum - 1.0).abs() <= 1e-6, "importances sum to {sum}");

    fs::remove_dir_all(out.parent().unwrap()).ok();
}

#[test]
fn two_runs_are_byte_identical() {
    let (csv, out) = workspace("idempotent");
    let config = quick_config(3);

    run(&csv, &out, &config).unwrap();
    let addresses = json_addresses(&out);
    let first: Vec<(String, Vec<u8>)> = addresses
        .iter()
        .map(|a| (a.clone(), fs::read(out.join(a)).unwrap()))
        .collect();

    run(&csv, &out, &config).unwrap();
    assert_eq!(json_addresses(&out), addresses);
    for (address, bytes) in first {
        assert_eq!(
            fs::read(out.join(&address)).unwrap(),
            bytes,
            "artifact {address} changed between runs"
        );
    }

    fs::remove_dir_all(out.parent().unwrap()).ok();
}

#[test]
fn enumeration_is_total_over_realized_region_years() {
    let (csv, out) = workspace("totality");
    run(&csv, &out, &quick_config(3)).unwrap();

    // Exactly the realized (region, year) pairs have a scatter artifact.
    for address in [
        "scatter-rainfall-by-region-Kota-Alpha-year2020.json",
        "scatter-rainfall-by-region-Kota-Alpha-year2021.json",
        "scatter-rainfall-by-region-Kota-Beta-Raya-year2020.json",
    ] {
        assert!(out.join(address).exists(), "missing {address}");
    }
    // Beta was never observed in 2021: no artifact may exist.
    assert!(!out
        .join("scatter-rainfall-by-region-Kota-Beta-Raya-year2021.json")
        .exists());

    // The region index for 2021 excludes the absent region.
    let regions_2021 = read_json(&out, "available-regions-year2021.json");
    assert_eq!(
        regions_2021["regions"].as_array().unwrap().len(),
        1,
        "2021 index: {regions_2021}"
    );
    assert_eq!(regions_2021["regions"][0], "Kota Alpha");

    let years = read_json(&out, "available-years.json");
    assert_eq!(years["years"], serde_json::json!([2020, 2021]));
    assert_eq!(years["default"], 2021);

    fs::remove_dir_all(out.parent().unwrap()).ok();
}

#[test]
fn manifest_equals_the_realized_address_set() {
    let (csv, out) = workspace("manifest");
    run(&csv, &out, &quick_config(3)).unwrap();

    let manifest = read_json(&out, "manifest.json");
    let indexed: BTreeSet<String> = manifest["addresses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a.as_str().unwrap().to_string())
        .collect();

    let mut on_disk = json_addresses(&out);
    on_disk.remove("manifest.json");

    assert_eq!(indexed, on_disk);
    assert_eq!(manifest["artifact_count"], on_disk.len());

    fs::remove_dir_all(out.parent().unwrap()).ok();
}

#[test]
fn undersized_partition_is_skipped_and_reported() {
    let (csv, out) = workspace("skip");
    // 2021 has 3 rows; 2020 has 6; the whole panel has 9.
    let summary = run(&csv, &out, &quick_config(6)).unwrap();

    assert_eq!(summary.partitions_skipped.len(), 1);
    let skip = &summary.partitions_skipped[0];
    assert_eq!(skip.partition, "2021");
    assert!(skip.reason.contains("fewer than the minimum"), "{}", skip.reason);
    assert!(summary
        .partitions_trained
        .contains(&"2020".to_string()));

    // The skipped partition has no model-dependent artifacts...
    assert!(!out.join("monthly-results-year2021.json").exists());
    assert!(!out.join("bar-chart-data-year2021.json").exists());
    // ...while its siblings exported, and data-only artifacts still
    // cover 2021.
    assert!(out.join("monthly-results-year2020.json").exists());
    assert!(out.join("line-chart-data-year2021.json").exists());
    assert!(out.join("raw-data-year2021.json").exists());

    fs::remove_dir_all(out.parent().unwrap()).ok();
}

#[test]
fn shrinking_the_input_removes_stale_artifacts() {
    let (csv, out) = workspace("shrink");
    run(&csv, &out, &quick_config(3)).unwrap();
    assert!(out.join("line-chart-data-year2021.json").exists());

    // Re-run on a 2020-only panel: 2021 addresses must disappear.
    let csv_2020: String = synthetic_csv()
        .lines()
        .filter(|line| !line.starts_with("2021"))
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&csv, csv_2020).unwrap();
    run(&csv, &out, &quick_config(3)).unwrap();

    assert!(!out.join("line-chart-data-year2021.json").exists());
    assert!(!out
        .join("scatter-rainfall-by-region-Kota-Alpha-year2021.json")
        .exists());
    let years = read_json(&out, "available-years.json");
    assert_eq!(years["years"], serde_json::json!([2020]));

    fs::remove_dir_all(out.parent().unwrap()).ok();
}

#[test]
fn malformed_input_aborts_without_exporting() {
    let base = std::env::temp_dir().join(format!("aedes-e2e-abort-{}", std::process::id()));
    fs::create_dir_all(&base).unwrap();
    let csv = base.join("panel.csv");
    // Non-numeric case count.
    fs::write(
        &csv,
        format!("{HEADER}\n2020,1,Jawa Barat,Kota Alpha,banyak,30,150.0,1000.0"),
    )
    .unwrap();

    let out = base.join("api");
    assert!(run(&csv, &out, &quick_config(3)).is_err());
    assert!(!out.exists(), "no partial export may be written");

    fs::remove_dir_all(&base).ok();
}

//! Build and export an artifact set for a tiny in-memory panel.

use std::collections::BTreeMap;

use aedes_data::{Observation, Panel};
use aedes_export::{build_artifacts, ExportSet};
use aedes_model::{train_partition, Dataset, ForestConfig, Partition, TrainerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut observations = Vec::new();
    for (region, density) in [("Kota Bandung", 15000.0), ("Kabupaten Garut", 850.0)] {
        for month in 1..=12u32 {
            observations.push(Observation {
                province: "Jawa Barat".to_string(),
                region: region.to_string(),
                year: 2024,
                month,
                monthly_cases: month * 4 + (density as u32 / 1000),
                annual_cases: 400,
                rainfall_mm: 120.0 + 15.0 * month as f64,
                population_density: density,
            });
        }
    }
    let panel = Panel::from_observations(observations)?;

    let mut dataset = Dataset::new(vec![
        "jumlah_curah_hujan".to_string(),
        "kepadatan_penduduk".to_string(),
        "bulan".to_string(),
    ]);
    for obs in panel.observations() {
        dataset.add_sample(
            vec![obs.rainfall_mm, obs.population_density, obs.month as f64],
            obs.monthly_cases as f64,
        );
    }

    let config = TrainerConfig {
        forest: ForestConfig {
            n_trees: 50,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut models = BTreeMap::new();
    for partition in [Partition::AllYears, Partition::Year(2024)] {
        models.insert(partition, train_partition(&dataset, partition, &config)?);
    }

    let artifacts = build_artifacts(&panel, &models)?;
    let set = ExportSet::new(artifacts)?;

    let out = std::env::temp_dir().join("aedes-export-demo");
    let written = set.write_to_dir(&out)?;
    println!("{written} artifacts written to {}", out.display());
    for address in set.addresses() {
        println!("  {address}");
    }

    Ok(())
}

//! Run the full export pipeline over a dataset CSV.
//!
//! ```sh
//! RUST_LOG=info cargo run --example run_pipeline -- data/kasus_dbd.csv public/api
//! ```

use aedes::pipeline::{run, PipelineConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let csv = args.next().unwrap_or_else(|| "data/kasus_dbd.csv".to_string());
    let out = args.next().unwrap_or_else(|| "public/api".to_string());

    let summary = run(&csv, &out, &PipelineConfig::default())?;

    println!("panel: {} observations, {} regions", summary.observations, summary.regions);
    println!("years: {:?}", summary.years);
    println!("trained partitions: {:?}", summary.partitions_trained);
    for skip in &summary.partitions_skipped {
        println!("skipped {}: {}", skip.partition, skip.reason);
    }
    println!("{} artifacts written to {out}", summary.artifacts_written);

    Ok(())
}

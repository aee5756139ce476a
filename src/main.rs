use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use tracing::info;
use tracing_subscriber::EnvFilter;
use windprofile_rs::io::csv::CsvOutput;
use windprofile_rs::io::netcdf::{read_dataset, write_netcdf_output};
use windprofile_rs::{DataArray, extrapolate_wind_speed};

mod cli;

use cli::get_args;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration
    let config = get_args()?;

    println!("Reading dataset...");
    let dataset = read_dataset(&config.input)?;
    let heights: Vec<u32> = dataset.wind_heights().collect();
    info!(variables = dataset.len(), ?heights, "dataset loaded");

    println!("\nExtrapolation Configuration:");
    println!("  Input: {:?}", config.input);
    println!("  Stored heights: {:?} m", heights);
    println!("  Target heights: {:?} m", config.to_heights);
    match config.from_height {
        Some(h) => println!("  Source height: {} m", h),
        None => println!("  Source height: closest stored"),
    }

    let pb = ProgressBar::new(config.to_heights.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} heights ({eta})")?
            .progress_chars("#>-")
    );

    let mut results = Vec::with_capacity(config.to_heights.len());
    for &to_height in &config.to_heights {
        let array = extrapolate_wind_speed(&dataset, to_height, config.from_height)
            .with_context(|| format!("Failed to extrapolate wind speed to {} m", to_height))?;
        info!(name = array.name(), "wind speed ready");
        results.push(array);
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Targets truncating to the same height share one output variable
    let mut seen = HashSet::new();
    let arrays: Vec<&DataArray> = results
        .iter()
        .map(|array| &**array)
        .filter(|array| seen.insert(array.name().to_string()))
        .collect();

    if config.format.writes_netcdf() {
        let path = config.netcdf_path();
        write_netcdf_output(&path, &dataset, &arrays)?;
        println!("\nNetCDF results saved to {:?}", path);
    }

    if config.format.writes_csv() {
        if let Some(first) = arrays.first() {
            let path = config.csv_path();
            let mut csv_output = CsvOutput::create(&path, first.dims())?;
            for array in &arrays {
                csv_output.write_array(&dataset, array)?;
            }
            csv_output.flush()?;
            println!("CSV results saved to {:?}", path);
        }
    }

    println!("\nExtrapolated {} wind speed variable(s)", arrays.len());
    Ok(())
}

use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;
use windprofile_rs::config::{OutputFormat, RunConfig};

/// Extrapolate reanalysis wind speeds to other hub heights
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// NetCDF file with wnd<H>m wind speeds and roughness
    input: PathBuf,

    /// Target height in meters, may be repeated
    #[arg(short, long = "to-height", required = true)]
    to_heights: Vec<f64>,

    /// Source height in meters, defaults to the stored height closest to each target
    #[arg(short, long)]
    from_height: Option<u32>,

    /// Output path without extension
    #[arg(short, long, default_value = "wind_extrapolated")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::NetCdf)]
    format: OutputFormat,
}

pub fn get_args() -> Result<RunConfig> {
    let args = Args::parse();

    if !args.input.is_file() {
        bail!("Input file not found: {:?}", args.input);
    }

    Ok(RunConfig {
        input: args.input,
        output_stem: args.output,
        to_heights: args.to_heights,
        from_height: args.from_height,
        format: args.format,
    })
}

use clap::ValueEnum;
use std::path::PathBuf;

// Output format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    #[value(name = "netcdf")]
    NetCdf,
    Both,
}

impl OutputFormat {
    pub fn writes_csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    pub fn writes_netcdf(self) -> bool {
        matches!(self, OutputFormat::NetCdf | OutputFormat::Both)
    }
}

// Settings for one extrapolation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output_stem: PathBuf,
    pub to_heights: Vec<f64>,
    pub from_height: Option<u32>,
    pub format: OutputFormat,
}

impl RunConfig {
    pub fn netcdf_path(&self) -> PathBuf {
        self.output_stem.with_extension("nc")
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_stem.with_extension("csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_follow_stem() {
        let config = RunConfig {
            input: PathBuf::from("era5.nc"),
            output_stem: PathBuf::from("out/wind"),
            to_heights: vec![100.0],
            from_height: None,
            format: OutputFormat::Both,
        };
        assert_eq!(config.netcdf_path(), PathBuf::from("out/wind.nc"));
        assert_eq!(config.csv_path(), PathBuf::from("out/wind.csv"));
    }

    #[test]
    fn format_selects_writers() {
        assert!(OutputFormat::Both.writes_csv() && OutputFormat::Both.writes_netcdf());
        assert!(!OutputFormat::Csv.writes_netcdf());
        assert!(!OutputFormat::NetCdf.writes_csv());
        assert_eq!(
            OutputFormat::from_str("netcdf", true),
            Ok(OutputFormat::NetCdf)
        );
    }
}

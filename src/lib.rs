//! Extrapolation of reanalysis wind speeds to other heights above ground
//! with the logarithmic wind profile.

pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod time;
pub mod wind;

pub use dataset::{Attributes, Coordinate, DataArray, Dataset};
pub use error::WindError;
pub use wind::extrapolate_wind_speed;

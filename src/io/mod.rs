pub mod csv;
pub mod netcdf;

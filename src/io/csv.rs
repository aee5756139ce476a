use crate::dataset::{Coordinate, DataArray, Dataset};
use anyhow::{Context, Result, bail};
use csv::{Writer, WriterBuilder};
use ndarray::Dimension;
use std::fs::File;
use std::path::Path;

// Long-format CSV: one row per grid point and variable
pub struct CsvOutput {
    writer: Writer<File>,
    dims: Vec<String>,
}

impl CsvOutput {
    /// Creates the file and writes the `variable,<dims...>,value` header.
    pub fn create(path: &Path, dims: &[String]) -> Result<Self> {
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Failed to create CSV file: {:?}", path))?;

        let mut header = Vec::with_capacity(dims.len() + 2);
        header.push("variable");
        header.extend(dims.iter().map(String::as_str));
        header.push("value");
        writer.write_record(&header)?;

        Ok(CsvOutput {
            writer,
            dims: dims.to_vec(),
        })
    }

    pub fn write_array(&mut self, dataset: &Dataset, array: &DataArray) -> Result<()> {
        if array.dims() != self.dims.as_slice() {
            bail!(
                "{} has dimensions {:?}, CSV columns are {:?}",
                array.name(),
                array.dims(),
                self.dims
            );
        }

        let labels: Vec<Vec<String>> = array
            .dims()
            .iter()
            .zip(array.shape())
            .map(|(dim, &len)| coordinate_labels(dataset.coord(dim), len))
            .collect();

        let mut record = Vec::with_capacity(labels.len() + 2);
        for (index, value) in array.values().indexed_iter() {
            record.clear();
            record.push(array.name().to_string());
            for (axis, &i) in index.slice().iter().enumerate() {
                record.push(labels[axis][i].clone());
            }
            record.push(value.to_string());
            self.writer.write_record(&record)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush CSV writer")
    }
}

// Timestamps for decodable time axes, raw coordinate values otherwise,
// plain indices when the dimension has no coordinate
fn coordinate_labels(coord: Option<&Coordinate>, len: usize) -> Vec<String> {
    match coord {
        Some(coord) if coord.len() == len => (0..len)
            .map(|i| match coord.datetime(i) {
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => coord.values[i].to_string(),
            })
            .collect(),
        _ => (0..len).map(|i| i.to_string()).collect(),
    }
}

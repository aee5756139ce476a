use crate::dataset::{Attributes, Coordinate, DataArray, Dataset};
use anyhow::{Context, Result};
use chrono::Utc;
use ndarray::{ArrayD, IxDyn};
use netcdf::AttributeValue;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

pub const FILL_VALUE: f32 = -9999.0;

// Checking first avoids HDF5 printing errors for absent attributes
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        _ => None,
    }
}

// Only text attributes are carried; packing attributes are applied on read
fn string_attributes(var: &netcdf::Variable) -> Attributes {
    var.attributes()
        .filter_map(|attr| match attr.value() {
            Ok(AttributeValue::Str(value)) => Some((attr.name().to_string(), value)),
            _ => None,
        })
        .collect()
}

// Applies scale_factor/add_offset and maps fill values to NaN
fn unpack(var: &netcdf::Variable, raw: Vec<f64>) -> Vec<f64> {
    let scale = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);
    let fill = get_f64_attr(var, "_FillValue");
    let missing = get_f64_attr(var, "missing_value");

    raw.into_iter()
        .map(|v| {
            if Some(v) == fill || Some(v) == missing {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect()
}

/// Reads every numeric variable of a NetCDF file. One-dimensional variables
/// named after their dimension become coordinates.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let file = netcdf::open(path)
        .with_context(|| format!("Failed to open NetCDF file: {:?}", path))?;

    let mut dataset = Dataset::new();
    for var in file.variables() {
        let name = var.name();
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        let raw: Vec<f64> = match var.get_values(..) {
            Ok(values) => values,
            Err(e) => {
                warn!(variable = %name, error = %e, "skipping variable that is not numeric");
                continue;
            }
        };
        let values = unpack(&var, raw);
        let attrs = string_attributes(&var);

        if dims.len() == 1 && dims[0] == name {
            dataset
                .add_coord(name.as_str(), Coordinate::new(values).with_attrs(attrs))
                .with_context(|| format!("Invalid coordinate in {:?}", path))?;
        } else {
            let values = ArrayD::from_shape_vec(IxDyn(&shape), values)
                .with_context(|| format!("Failed to shape variable {}", name))?;
            let array = DataArray::new(name.as_str(), dims, values)?.with_attrs(attrs);
            dataset
                .insert(array)
                .with_context(|| format!("Failed to add variable {}", name))?;
        }
        debug!(variable = %name, "read variable");
    }

    Ok(dataset)
}

/// Writes `arrays` with the coordinates they use from `dataset`. Non-finite
/// values are stored as `FILL_VALUE`.
pub fn write_netcdf_output(filename: &Path, dataset: &Dataset, arrays: &[&DataArray]) -> Result<()> {
    let mut file = netcdf::create(filename)
        .with_context(|| format!("Failed to create NetCDF file: {:?}", filename))?;

    let mut added = BTreeSet::new();
    for array in arrays {
        for (dim, &len) in array.dims().iter().zip(array.shape()) {
            if !added.insert(dim.clone()) {
                continue;
            }
            file.add_dimension(dim, len)?;

            if let Some(coord) = dataset.coord(dim) {
                let mut coord_var = file.add_variable::<f64>(dim, &[dim.as_str()])?;
                for (key, value) in coord.attrs.iter() {
                    coord_var.put_attribute(key, value)?;
                }
                coord_var.put_values(&coord.values, ..)?;
            }
        }

        let dims: Vec<&str> = array.dims().iter().map(String::as_str).collect();
        let mut var = file.add_variable::<f32>(array.name(), &dims)?;
        var.put_attribute("_FillValue", FILL_VALUE)?;
        for (key, value) in array.attrs().iter() {
            var.put_attribute(key, value)?;
        }

        let data: Vec<f32> = array
            .values()
            .iter()
            .map(|&v| if v.is_finite() { v as f32 } else { FILL_VALUE })
            .collect();
        var.put_values(&data, ..)
            .with_context(|| format!("Failed to write variable {}", array.name()))?;
    }

    // Global attributes
    file.add_attribute("TITLE", "OUTPUT FROM WINDPROFILE_RS")?;
    file.add_attribute(
        "history",
        format!("created {}", Utc::now().format("%Y-%m-%d %H:%M:%S")),
    )?;

    Ok(())
}

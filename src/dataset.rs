use crate::error::WindError;
use crate::time;
use crate::wind::{parse_wind_speed_height, wind_speed_name};
use chrono::NaiveDateTime;
use ndarray::{ArrayD, ArrayViewD, Axis};
use std::collections::BTreeMap;

// Ordered string attributes attached to arrays and coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes {
            entries: Vec::new(),
        }
    }

    /// Sets `key`, keeping its original position if it was already present.
    /// Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

// Values along one dimension (time, latitude, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub values: Vec<f64>,
    pub attrs: Attributes,
}

impl Coordinate {
    pub fn new(values: Vec<f64>) -> Self {
        Coordinate {
            values,
            attrs: Attributes::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decodes entry `index` as a timestamp using the CF `units` attribute.
    pub fn datetime(&self, index: usize) -> Option<NaiveDateTime> {
        let units = self.attrs.get("units")?;
        time::decode(units, *self.values.get(index)?)
    }
}

/// A named n-dimensional array of `f64` with one name per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    dims: Vec<String>,
    values: ArrayD<f64>,
    attrs: Attributes,
}

impl DataArray {
    pub fn new(
        name: impl Into<String>,
        dims: impl IntoIterator<Item = impl Into<String>>,
        values: ArrayD<f64>,
    ) -> Result<Self, WindError> {
        let name = name.into();
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();

        if dims.len() != values.ndim() {
            return Err(WindError::ShapeMismatch(format!(
                "'{}' has {} dimension names for a {}-d array",
                name,
                dims.len(),
                values.ndim()
            )));
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) {
                return Err(WindError::ShapeMismatch(format!(
                    "'{}' repeats dimension '{}'",
                    name, dim
                )));
            }
        }

        Ok(DataArray {
            name,
            dims,
            values,
            attrs: Attributes::new(),
        })
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|axis| self.values.len_of(Axis(axis)))
    }

    /// View of the values with axes reordered to follow `dims` and a unit
    /// axis inserted for every name in `dims` this array does not carry.
    /// The result is ready for `broadcast` against an array laid out as `dims`.
    pub fn aligned_to(&self, dims: &[String]) -> Result<ArrayViewD<'_, f64>, WindError> {
        let mut target_axes = Vec::with_capacity(self.dims.len());
        for dim in &self.dims {
            let axis = dims.iter().position(|d| d == dim).ok_or_else(|| {
                WindError::ShapeMismatch(format!(
                    "'{}' has dimension '{}' not found in {:?}",
                    self.name, dim, dims
                ))
            })?;
            target_axes.push(axis);
        }

        let mut order: Vec<usize> = (0..self.dims.len()).collect();
        order.sort_by_key(|&axis| target_axes[axis]);
        let mut view = self.values.view().permuted_axes(order.as_slice());

        for axis in 0..dims.len() {
            if !target_axes.contains(&axis) {
                view = view.insert_axis(Axis(axis));
            }
        }
        Ok(view)
    }
}

/// Named arrays sharing one set of dimensions.
///
/// Wind speed variables (`wnd<H>m`) are indexed by height on insert, so
/// lookups by height never parse names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    dims: BTreeMap<String, usize>,
    coords: BTreeMap<String, Coordinate>,
    variables: BTreeMap<String, DataArray>,
    wind_heights: BTreeMap<u32, String>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    fn check_dims<'a>(
        &self,
        dims: impl IntoIterator<Item = (&'a String, usize)>,
    ) -> Result<(), WindError> {
        for (name, len) in dims {
            if let Some(&expected) = self.dims.get(name) {
                if expected != len {
                    return Err(WindError::DimensionMismatch {
                        name: name.clone(),
                        expected,
                        found: len,
                    });
                }
            }
        }
        Ok(())
    }

    /// Adds or replaces a variable, returning the one it replaced.
    pub fn insert(&mut self, array: DataArray) -> Result<Option<DataArray>, WindError> {
        self.check_dims(array.dims().iter().zip(array.shape().iter().copied()))?;

        for (dim, &len) in array.dims().iter().zip(array.shape()) {
            self.dims.insert(dim.clone(), len);
        }
        if let Some(height) = parse_wind_speed_height(array.name()) {
            self.wind_heights.insert(height, array.name().to_string());
        }
        Ok(self.variables.insert(array.name().to_string(), array))
    }

    /// Removes a variable. Dimension lengths it registered stay registered.
    pub fn remove(&mut self, name: &str) -> Option<DataArray> {
        if let Some(height) = parse_wind_speed_height(name) {
            self.wind_heights.remove(&height);
        }
        self.variables.remove(name)
    }

    pub fn add_coord(&mut self, dim: impl Into<String>, coord: Coordinate) -> Result<(), WindError> {
        let dim = dim.into();
        self.check_dims([(&dim, coord.len())])?;
        self.dims.insert(dim.clone(), coord.len());
        self.coords.insert(dim, coord);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.variables.get(name)
    }

    /// Like `get`, but a missing variable is an error.
    pub fn variable(&self, name: &str) -> Result<&DataArray, WindError> {
        self.get(name)
            .ok_or_else(|| WindError::VariableNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.coords.get(dim)
    }

    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    /// Heights (m) of the wind speed variables, ascending.
    pub fn wind_heights(&self) -> impl Iterator<Item = u32> + '_ {
        self.wind_heights.keys().copied()
    }

    pub fn wind_speed(&self, height: u32) -> Result<&DataArray, WindError> {
        self.wind_heights
            .get(&height)
            .and_then(|name| self.variables.get(name))
            .ok_or_else(|| WindError::VariableNotFound(wind_speed_name(f64::from(height))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn, array};

    fn grid(name: &str, dims: &[&str], shape: &[usize], value: f64) -> DataArray {
        DataArray::new(name, dims.iter().copied(), Array::from_elem(IxDyn(shape), value)).unwrap()
    }

    #[test]
    fn attributes_overwrite_in_place() {
        let mut attrs: Attributes = [("units", "m"), ("long name", "height")].into_iter().collect();
        assert_eq!(attrs.insert("units", "km"), Some("m".to_string()));
        assert_eq!(attrs.get("units"), Some("km"));
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["units", "long name"]);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn data_array_rejects_bad_dims() {
        let values = array![[1.0, 2.0]].into_dyn();
        assert!(matches!(
            DataArray::new("a", ["x"], values.clone()),
            Err(WindError::ShapeMismatch(_))
        ));
        assert!(matches!(
            DataArray::new("a", ["x", "x"], values),
            Err(WindError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn insert_indexes_wind_heights() {
        let mut ds = Dataset::new();
        ds.insert(grid("wnd100m", &["time", "y"], &[2, 3], 1.0)).unwrap();
        ds.insert(grid("wnd10m", &["time", "y"], &[2, 3], 1.0)).unwrap();
        ds.insert(grid("roughness", &["y"], &[3], 0.1)).unwrap();
        ds.insert(grid("wnd_dir", &["time", "y"], &[2, 3], 0.0)).unwrap();

        assert_eq!(ds.wind_heights().collect::<Vec<_>>(), [10, 100]);
        assert_eq!(ds.wind_speed(100).unwrap().name(), "wnd100m");
        assert_eq!(
            ds.wind_speed(50),
            Err(WindError::VariableNotFound("wnd50m".to_string()))
        );

        ds.remove("wnd10m");
        assert_eq!(ds.wind_heights().collect::<Vec<_>>(), [100]);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn insert_rejects_inconsistent_dimension_lengths() {
        let mut ds = Dataset::new();
        ds.add_coord("time", Coordinate::new(vec![0.0, 1.0])).unwrap();
        ds.insert(grid("wnd10m", &["time", "y"], &[2, 3], 1.0)).unwrap();

        let err = ds.insert(grid("roughness", &["y"], &[4], 0.1)).unwrap_err();
        assert_eq!(
            err,
            WindError::DimensionMismatch {
                name: "y".to_string(),
                expected: 3,
                found: 4
            }
        );
        assert!(ds.add_coord("time", Coordinate::new(vec![0.0])).is_err());
        assert!(!ds.contains("roughness"));
    }

    #[test]
    fn variable_lookup_reports_missing_name() {
        let ds = Dataset::new();
        assert_eq!(
            ds.variable("roughness"),
            Err(WindError::VariableNotFound("roughness".to_string()))
        );
    }

    #[test]
    fn aligned_view_broadcasts_over_missing_and_transposed_dims() {
        // roughness stored as (x, y), wind as (time, y, x)
        let z0 = DataArray::new("roughness", ["x", "y"], array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]].into_dyn())
            .unwrap();
        let dims: Vec<String> = ["time", "y", "x"].iter().map(|s| s.to_string()).collect();

        let view = z0.aligned_to(&dims).unwrap();
        assert_eq!(view.shape(), &[1, 2, 3]);
        let full = view.broadcast(IxDyn(&[4, 2, 3])).unwrap();
        assert_eq!(full[[3, 1, 0]], 2.0);
        assert_eq!(full[[0, 0, 2]], 5.0);
    }

    #[test]
    fn aligned_view_rejects_foreign_dimension() {
        let z0 = grid("roughness", &["station"], &[2], 0.1);
        let dims = vec!["time".to_string(), "y".to_string()];
        assert!(matches!(z0.aligned_to(&dims), Err(WindError::ShapeMismatch(_))));
    }

    #[test]
    fn coordinate_decodes_time() {
        let time = Coordinate::new(vec![0.0, 6.0]).with_attrs(
            [("units", "hours since 2013-01-01 00:00:00")].into_iter().collect(),
        );
        let dt = time.datetime(1).unwrap();
        assert_eq!(dt.to_string(), "2013-01-01 06:00:00");
        assert!(time.datetime(2).is_none());
        assert!(Coordinate::new(vec![1.0]).datetime(0).is_none());
    }
}

//! Logarithmic wind profile extrapolation.
//!
//! Wind speed at height `h` over terrain with roughness length `z0` follows
//! `u(h) ∝ ln(h / z0)`, so a measurement at one height scales to another by
//! the ratio of the two logarithms. See equation (2) in Andresen et al. (2015),
//! "Validation of Danish wind time series from a new global renewable energy
//! atlas for energy system analysis".

use crate::dataset::{Attributes, DataArray, Dataset};
use crate::error::WindError;
use ndarray::Zip;
use std::borrow::Cow;
use tracing::debug;

/// Name of the surface roughness length variable (m).
pub const ROUGHNESS: &str = "roughness";

pub const LONG_NAME: &str = "long name";
pub const UNITS: &str = "units";
pub const WIND_SPEED_UNITS: &str = "m s**-1";

/// `wnd<H>m`, with the height truncated toward zero.
pub fn wind_speed_name(height: f64) -> String {
    format!("wnd{}m", height as i64)
}

/// Height of a `wnd<H>m` variable name. Only canonical names match, so
/// `wnd010m` or `wnd_dir` are not wind speed variables.
pub fn parse_wind_speed_height(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("wnd")?.strip_suffix('m')?;
    let height: u32 = digits.parse().ok()?;
    (height.to_string() == digits).then_some(height)
}

/// The height closest to `to_height`. Equally close heights resolve to the
/// lowest one, as does a NaN target.
pub fn closest_height(heights: impl IntoIterator<Item = u32>, to_height: f64) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for height in heights {
        let distance = (f64::from(height) - to_height).abs();
        best = match best {
            None => Some((height, distance)),
            Some((h, d))
                if distance < d || ((distance == d || distance.is_nan()) && height < h) =>
            {
                Some((height, distance))
            }
            keep => keep,
        };
    }
    best.map(|(height, _)| height)
}

/// Scales `speed` measured at `from_height` to `to_height` over roughness
/// length `roughness`. Degenerate inputs (non-positive roughness, roughness
/// equal to either height) yield NaN or infinity rather than an error.
#[inline]
pub fn log_law(speed: f64, to_height: f64, from_height: f64, roughness: f64) -> f64 {
    speed * ((to_height / roughness).ln() / (from_height / roughness).ln())
}

/// Wind speed at `to_height` (m) for every point of the dataset grid.
///
/// If the dataset already holds `wnd<to_height>m` it is returned as is.
/// Otherwise the speeds at `from_height`, or at the stored height closest
/// to `to_height` when none is given, are scaled with [`log_law`] using the
/// `roughness` variable broadcast over the wind speed dimensions.
///
/// The result is named `wnd<to_height>m` and carries only the `long name`
/// and `units` attributes.
pub fn extrapolate_wind_speed(
    ds: &Dataset,
    to_height: f64,
    from_height: Option<u32>,
) -> Result<Cow<'_, DataArray>, WindError> {
    let to_name = wind_speed_name(to_height);
    if let Some(existing) = ds.get(&to_name) {
        debug!(name = %to_name, "wind speed already present, no extrapolation");
        return Ok(Cow::Borrowed(existing));
    }

    let from_height = match from_height {
        Some(height) => height,
        None => {
            let height = closest_height(ds.wind_heights(), to_height).ok_or_else(|| {
                WindError::MissingData("wind speed not present in dataset".to_string())
            })?;
            debug!(from_height = height, to_height, "selected closest wind speed height");
            height
        }
    };

    let wind = ds.wind_speed(from_height)?;
    let roughness = ds.variable(ROUGHNESS)?;

    let aligned = roughness.aligned_to(wind.dims())?;
    let z0 = aligned.broadcast(wind.values().raw_dim()).ok_or_else(|| {
        WindError::ShapeMismatch(format!(
            "{} {:?} cannot be broadcast to {} {:?}",
            ROUGHNESS,
            roughness.shape(),
            wind.name(),
            wind.shape()
        ))
    })?;

    let from = f64::from(from_height);
    let values = Zip::from(wind.values())
        .and(&z0)
        .map_collect(|&speed, &z| log_law(speed, to_height, from, z));

    let mut attrs = Attributes::new();
    attrs.insert(
        LONG_NAME,
        format!(
            "extrapolated {} m wind speed using logarithmic method with roughness and {} m wind speed",
            to_height, from_height
        ),
    );
    attrs.insert(UNITS, WIND_SPEED_UNITS);

    let array = DataArray::new(to_name, wind.dims().iter().cloned(), values)?.with_attrs(attrs);
    Ok(Cow::Owned(array))
}

//! Synthetic grids and datasets with predictable values.
//!
//! These generators feed the command-line demo and the test suite. Values
//! depend only on the cell latitude, the level and the time index, so any
//! merge or regrid result can be checked by hand.

use crate::data::{Dataset, DebugInfo, Grid, GriddedValues, ValueTable};
use ndarray::Array4;

/// A global grid of `n_lon x n_lat` equal-angle cells.
///
/// Longitudes run from 0 to 360, latitudes from -90 to 90, centers sit in
/// the middle of each cell.
///
/// # Example
///
/// ```
/// use climops::synthetic::global_grid;
///
/// let grid = global_grid(4, 2);
/// assert_eq!(grid.shape(), (4, 2));
/// assert_eq!(grid.lon[[0, 0]], 45.0);
/// assert_eq!(grid.lat[[0, 1]], 45.0);
/// ```
pub fn global_grid(n_lon: usize, n_lat: usize) -> Grid {
    let dlon = 360.0 / n_lon.max(1) as f64;
    let dlat = 180.0 / n_lat.max(1) as f64;
    let lon: Vec<f64> = (0..n_lon).map(|i| dlon * (i as f64 + 0.5)).collect();
    let lat: Vec<f64> = (0..n_lat)
        .map(|j| -90.0 + dlat * (j as f64 + 0.5))
        .collect();
    Grid::rectilinear(&lon, &lat)
}

/// A regional grid whose first cell center is `(lon0, lat0)`.
pub fn regional_grid(lon0: f64, lat0: f64, step: f64, n_lon: usize, n_lat: usize) -> Grid {
    let lon: Vec<f64> = (0..n_lon).map(|i| lon0 + step * i as f64).collect();
    let lat: Vec<f64> = (0..n_lat).map(|j| lat0 + step * j as f64).collect();
    Grid::rectilinear(&lon, &lat)
}

/// `n` evenly spaced time stamps starting at `start`.
pub fn time_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|k| start + step * k as f64).collect()
}

/// Temperature-like values in Kelvin.
///
/// Warm at the equator (about 300 K), cold at the poles (about 240 K), one
/// kelvin cooler per level, and 0.01 K warmer per time step.
pub fn temperature_field(grid: &Grid, n_lev: usize, n_time: usize) -> Array4<f64> {
    let (n_lon, n_lat) = grid.shape();
    Array4::from_shape_fn((n_lon, n_lat, n_lev, n_time), |(i, j, k, t)| {
        let lat = grid.lat[[i, j]].to_radians();
        240.0 + 60.0 * lat.cos() - k as f64 + 0.01 * t as f64
    })
}

/// A monthly near-surface temperature dataset for one experiment.
pub fn experiment(grid: Grid, experiment: &str, time: Vec<f64>, tabular: bool) -> Dataset {
    let field = temperature_field(&grid, 1, time.len());
    let values = if tabular {
        GriddedValues::Tabular(ValueTable::from_dense(&field))
    } else {
        GriddedValues::Dense(field)
    };
    let n = time.len();
    let mut ds = Dataset::new("tas", grid, time, values);
    ds.model = "SYNTH-1".to_string();
    ds.domain = "GLB".to_string();
    ds.value_unit = "K".to_string();
    ds.ensembles = vec!["r1i1p1".to_string()];
    ds.files = vec![format!("tas_SYNTH-1_{}_r1i1p1.nc", experiment)];
    ds.experiment = experiment.to_string();
    ds.debug = DebugInfo {
        time_freq_str: "mon".to_string(),
    };
    ds.provenance
        .record(format!("synthetic: '{}' with {} time steps", experiment, n));
    ds
}

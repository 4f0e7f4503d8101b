//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use climops::data::{DebugInfo, Grid, GriddedValues, ValueTable};
use climops::synthetic::regional_grid;
use climops::Dataset;
use ndarray::Array4;

/// A 2 x 3 regional grid with 1-degree cells centered at 10.5..11.5 E,
/// 40.5..42.5 N.
pub fn small_grid() -> Grid {
    regional_grid(10.5, 40.5, 1.0, 2, 3)
}

/// Values encode their own position: `1000 * time_stamp + 10 * lon + lat`.
pub fn coded_values(grid: &Grid, time: &[f64]) -> Array4<f64> {
    let (nlon, nlat) = grid.shape();
    Array4::from_shape_fn((nlon, nlat, 1, time.len()), |(i, j, _, t)| {
        1000.0 * time[t] + 10.0 * i as f64 + j as f64
    })
}

/// A dataset on [`small_grid`] with fixed metadata.
pub fn dataset(experiment: &str, time: Vec<f64>) -> Dataset {
    let grid = small_grid();
    let values = coded_values(&grid, &time);
    let mut ds = Dataset::new("tas", grid, time, values);
    ds.model = "MPI-ESM-LR".to_string();
    ds.domain = "EUR-44".to_string();
    ds.value_unit = "K".to_string();
    ds.ensembles = vec!["r1i1p1".to_string()];
    ds.files = vec![format!("{}.nc", experiment)];
    ds.experiment = experiment.to_string();
    ds.debug = DebugInfo {
        time_freq_str: "mon".to_string(),
    };
    ds.provenance.record(format!("loaded {}", experiment));
    ds
}

/// The same dataset with long-form values.
pub fn tabular(mut ds: Dataset) -> Dataset {
    ds.values = GriddedValues::Tabular(ValueTable::from_dense(&ds.values.to_dense()));
    ds
}

/// Relative difference of two totals.
pub fn rel_diff(a: f64, b: f64) -> f64 {
    ((a - b) / a).abs()
}

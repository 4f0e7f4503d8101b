//! Cell areas of lon/lat grids on a sphere.

use crate::config::RegridConfig;
use crate::data::{CellAxis, Grid};
use crate::error::{ClimopsError, Result};
use ndarray::Array2;

/// Computes the surface area of every cell of a rectilinear lon/lat grid.
///
/// The area of a cell bounded by longitudes `λ1..λ2` and latitudes `φ1..φ2`
/// is `R² · (λ2 - λ1) · (sin φ2 - sin φ1)`, which stays exact for cells that
/// touch a pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridArea {
    radius: f64,
    tolerance: f64,
}

impl Default for GridArea {
    fn default() -> Self {
        Self::from_config(&RegridConfig::default())
    }
}

impl GridArea {
    /// Use a sphere of the given radius.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            tolerance: RegridConfig::default().coordinate_tolerance,
        }
    }

    /// Take radius and coordinate tolerance from a regrid configuration.
    pub fn from_config(config: &RegridConfig) -> Self {
        Self {
            radius: config.earth_radius,
            tolerance: config.coordinate_tolerance,
        }
    }

    /// Area of every cell of `grid`, shaped like `grid.lon`.
    pub fn compute(&self, grid: &Grid) -> Result<Array2<f64>> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ClimopsError::precondition(format!(
                "sphere radius must be finite and positive, got {}",
                self.radius
            )));
        }
        let axes = grid.axes(self.tolerance)?;
        let r2 = self.radius * self.radius;
        Ok(Array2::from_shape_fn(grid.shape(), |(i, j)| {
            r2 * unit_cell_area(axes.lon.cells[i], axes.lat.cells[j])
        }))
    }
}

/// Cell areas for 2-D center coordinates on the default Earth sphere (km²).
pub fn compute_cell_area(lon: &Array2<f64>, lat: &Array2<f64>) -> Result<Array2<f64>> {
    GridArea::default().compute(&Grid::new(lon.clone(), lat.clone()))
}

/// Area of a lon/lat box on the unit sphere.
pub(crate) fn unit_cell_area(lon: (f64, f64), lat: (f64, f64)) -> f64 {
    (lon.1 - lon.0).to_radians() * (lat.1.to_radians().sin() - lat.0.to_radians().sin())
}

/// Overlapping longitude extent of two intervals in degrees, modulo 360.
///
/// Both intervals must be at most 360° wide; their shifted copies are then
/// disjoint, so summing over shifts never counts a piece twice.
pub(crate) fn lon_overlap(a: (f64, f64), b: (f64, f64)) -> f64 {
    (-2..=2)
        .map(|k| {
            let shift = 360.0 * k as f64;
            (a.1.min(b.1 + shift) - a.0.max(b.0 + shift)).max(0.0)
        })
        .sum()
}

/// Overlapping latitude band of two intervals as `sin φ2 - sin φ1`.
///
/// Intersections no wider than `tolerance` degrees count as touching edges.
pub(crate) fn lat_overlap(a: (f64, f64), b: (f64, f64), tolerance: f64) -> f64 {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if hi - lo <= tolerance {
        return 0.0;
    }
    hi.to_radians().sin() - lo.to_radians().sin()
}

/// Sparse overlap list: for every cell of `dst`, the `src` cells it touches
/// and the overlap measure, keeping only overlaps above `threshold`.
pub(crate) fn axis_overlaps(
    dst: &CellAxis,
    src: &CellAxis,
    overlap: impl Fn((f64, f64), (f64, f64)) -> f64,
    threshold: f64,
) -> Vec<Vec<(usize, f64)>> {
    dst.cells
        .iter()
        .map(|&d| {
            src.cells
                .iter()
                .enumerate()
                .filter_map(|(k, &s)| {
                    let o = overlap(d, s);
                    (o > threshold).then_some((k, o))
                })
                .collect()
        })
        .collect()
}

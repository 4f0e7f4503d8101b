//! Longitude/latitude grids and their cell boundaries.

use crate::error::{ClimopsError, Result};
use ndarray::Array2;

/// A lon/lat grid of cell centers, indexed `[lon_index, lat_index]`.
///
/// Cell boundaries are inferred from the centers (midpoints between
/// neighbours, half a step beyond the ends) unless explicit edges are
/// attached with [`Grid::with_bounds`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Longitude of each cell center, in degrees.
    pub lon: Array2<f64>,
    /// Latitude of each cell center, in degrees.
    pub lat: Array2<f64>,
    /// Optional longitude cell edges (`n_lon + 1` values).
    pub lon_bounds: Option<Vec<f64>>,
    /// Optional latitude cell edges (`n_lat + 1` values).
    pub lat_bounds: Option<Vec<f64>>,
}

impl Grid {
    /// Create a grid from 2-D center coordinates.
    pub fn new(lon: Array2<f64>, lat: Array2<f64>) -> Self {
        Self {
            lon,
            lat,
            lon_bounds: None,
            lat_bounds: None,
        }
    }

    /// Create a rectilinear grid from 1-D axes.
    pub fn rectilinear(lon: &[f64], lat: &[f64]) -> Self {
        let shape = (lon.len(), lat.len());
        Self::new(
            Array2::from_shape_fn(shape, |(i, _)| lon[i]),
            Array2::from_shape_fn(shape, |(_, j)| lat[j]),
        )
    }

    /// Attach explicit cell edges.
    pub fn with_bounds(mut self, lon_bounds: Vec<f64>, lat_bounds: Vec<f64>) -> Self {
        self.lon_bounds = Some(lon_bounds);
        self.lat_bounds = Some(lat_bounds);
        self
    }

    /// Shape as `(n_lon, n_lat)`.
    pub fn shape(&self) -> (usize, usize) {
        self.lon.dim()
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.lon.len()
    }

    /// Mean absolute center spacing along each axis, `(d_lon, d_lat)`.
    ///
    /// An axis with a single cell reports 0.
    pub fn resolution(&self) -> (f64, f64) {
        let (nx, ny) = self.shape();
        if nx == 0 || ny == 0 {
            return (0.0, 0.0);
        }
        let lon_axis: Vec<f64> = (0..nx).map(|i| self.lon[[i, 0]]).collect();
        let lat_axis: Vec<f64> = (0..ny).map(|j| self.lat[[0, j]]).collect();
        (mean_spacing(&unwrap_longitudes(&lon_axis)), mean_spacing(&lat_axis))
    }

    /// Reduce the grid to 1-D cell intervals per axis.
    ///
    /// Fails with `InvalidGrid` when the coordinate arrays disagree in shape,
    /// vary along the wrong dimension, or are not strictly monotonic.
    pub fn axes(&self, tolerance: f64) -> Result<GridAxes> {
        if self.lon.dim() != self.lat.dim() {
            return Err(ClimopsError::invalid_grid(format!(
                "lon shape {:?} does not match lat shape {:?}",
                self.lon.dim(),
                self.lat.dim()
            )));
        }
        let (nx, ny) = self.shape();
        if nx == 0 || ny == 0 {
            return Err(ClimopsError::invalid_grid("grid has no cells"));
        }
        if self.lon.iter().chain(self.lat.iter()).any(|v| !v.is_finite()) {
            return Err(ClimopsError::invalid_grid("non-finite coordinate"));
        }

        for ((i, j), &lon) in self.lon.indexed_iter() {
            if (lon - self.lon[[i, 0]]).abs() > tolerance {
                return Err(ClimopsError::invalid_grid(format!(
                    "longitude varies along latitude at cell ({}, {})",
                    i, j
                )));
            }
        }
        for ((i, j), &lat) in self.lat.indexed_iter() {
            if (lat - self.lat[[0, j]]).abs() > tolerance {
                return Err(ClimopsError::invalid_grid(format!(
                    "latitude varies along longitude at cell ({}, {})",
                    i, j
                )));
            }
        }

        let lon_centers = unwrap_longitudes(&(0..nx).map(|i| self.lon[[i, 0]]).collect::<Vec<_>>());
        let lat_centers: Vec<f64> = (0..ny).map(|j| self.lat[[0, j]]).collect();
        if lat_centers.iter().any(|l| l.abs() > 90.0) {
            return Err(ClimopsError::invalid_grid("latitude outside [-90, 90]"));
        }

        let lon_edges = match &self.lon_bounds {
            Some(b) => unwrap_longitudes(b),
            None => infer_edges(&lon_centers, "longitude")?,
        };
        let lat_edges = match &self.lat_bounds {
            Some(b) => b.clone(),
            None => infer_edges(&lat_centers, "latitude")?,
        };
        let lon = CellAxis::from_edges(&lon_edges, nx, "longitude")?;
        let mut lat = CellAxis::from_edges(&lat_edges, ny, "latitude")?;
        for cell in lat.cells.iter_mut() {
            cell.0 = cell.0.clamp(-90.0, 90.0);
            cell.1 = cell.1.clamp(-90.0, 90.0);
        }

        if lon.span() > 360.0 + tolerance {
            return Err(ClimopsError::invalid_grid(format!(
                "longitude cells span {} degrees, more than a full circle",
                lon.span()
            )));
        }

        Ok(GridAxes { lon, lat })
    }
}

/// The two axes of a rectilinear grid as cell intervals in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxes {
    /// Longitude intervals (unwrapped; may extend past 360 or below 0).
    pub lon: CellAxis,
    /// Latitude intervals, clamped to the poles.
    pub lat: CellAxis,
}

/// Ordered `(low, high)` intervals along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CellAxis {
    /// One interval per cell, `low <= high`, in the axis' storage order.
    pub cells: Vec<(f64, f64)>,
}

impl CellAxis {
    fn from_edges(edges: &[f64], n: usize, name: &str) -> Result<Self> {
        if edges.len() != n + 1 {
            return Err(ClimopsError::invalid_grid(format!(
                "{} bounds have {} values, expected {}",
                name,
                edges.len(),
                n + 1
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(ClimopsError::invalid_grid(format!("non-finite {} bound", name)));
        }
        strictly_monotonic(edges, name)?;
        let cells = edges
            .windows(2)
            .map(|w| (w[0].min(w[1]), w[0].max(w[1])))
            .collect();
        Ok(Self { cells })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the axis has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distance from the lowest to the highest edge.
    pub fn span(&self) -> f64 {
        let lo = self.cells.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let hi = self.cells.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    }
}

/// Remove 360° jumps so that a longitude sequence crossing the seam stays
/// continuous (e.g. `350, 0, 10` becomes `350, 360, 370`).
fn unwrap_longitudes(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut offset = 0.0;
    for (k, &v) in values.iter().enumerate() {
        if k > 0 {
            let prev = values[k - 1] + offset;
            let mut cur = v + offset;
            while cur - prev > 180.0 {
                offset -= 360.0;
                cur -= 360.0;
            }
            while cur - prev < -180.0 {
                offset += 360.0;
                cur += 360.0;
            }
        }
        out.push(v + offset);
    }
    out
}

fn strictly_monotonic(values: &[f64], name: &str) -> Result<()> {
    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let decreasing = values.windows(2).all(|w| w[1] < w[0]);
    if increasing || decreasing {
        Ok(())
    } else {
        Err(ClimopsError::invalid_grid(format!(
            "{} is not strictly monotonic",
            name
        )))
    }
}

fn infer_edges(centers: &[f64], name: &str) -> Result<Vec<f64>> {
    if centers.len() < 2 {
        return Err(ClimopsError::invalid_grid(format!(
            "cannot infer {} bounds from a single cell; supply explicit bounds",
            name
        )));
    }
    strictly_monotonic(centers, name)?;
    let n = centers.len();
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
    edges.extend(centers.windows(2).map(|w| (w[0] + w[1]) / 2.0));
    edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
    Ok(edges)
}

fn mean_spacing(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    (values[values.len() - 1] - values[0]).abs() / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_midpoints() {
        let grid = Grid::rectilinear(&[0.5, 1.5, 2.5], &[-0.5, 0.5]);
        let axes = grid.axes(1e-9).unwrap();
        assert_eq!(axes.lon.cells, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        assert_eq!(axes.lat.cells, vec![(-1.0, 0.0), (0.0, 1.0)]);
    }

    #[test]
    fn polar_edges_are_clamped() {
        let grid = Grid::rectilinear(&[0.0, 90.0], &[-90.0, 0.0, 90.0]);
        let axes = grid.axes(1e-9).unwrap();
        assert_eq!(axes.lat.cells[0], (-90.0, -45.0));
        assert_eq!(axes.lat.cells[2], (45.0, 90.0));
    }

    #[test]
    fn dateline_crossing_is_unwrapped() {
        let grid = Grid::rectilinear(&[340.0, 350.0, 0.0, 10.0], &[0.0, 10.0]);
        let axes = grid.axes(1e-9).unwrap();
        assert_eq!(axes.lon.cells[2], (355.0, 365.0));
    }

    #[test]
    fn descending_latitude_is_accepted() {
        let grid = Grid::rectilinear(&[0.0, 1.0], &[10.0, 0.0, -10.0]);
        let axes = grid.axes(1e-9).unwrap();
        assert_eq!(axes.lat.cells[0], (5.0, 15.0));
    }

    #[test]
    fn non_monotonic_is_rejected() {
        let grid = Grid::rectilinear(&[0.0, 2.0, 1.0], &[0.0, 1.0]);
        assert!(matches!(grid.axes(1e-9), Err(ClimopsError::InvalidGrid(_))));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let grid = Grid::new(Array2::zeros((2, 3)), Array2::zeros((3, 2)));
        assert!(matches!(grid.axes(1e-9), Err(ClimopsError::InvalidGrid(_))));
    }

    #[test]
    fn curvilinear_is_rejected() {
        let mut grid = Grid::rectilinear(&[0.0, 1.0], &[0.0, 1.0]);
        grid.lon[[0, 1]] = 0.5;
        assert!(matches!(grid.axes(1e-9), Err(ClimopsError::InvalidGrid(_))));
    }

    #[test]
    fn single_cell_needs_bounds() {
        let grid = Grid::rectilinear(&[0.0], &[0.0]);
        assert!(grid.axes(1e-9).is_err());
        let grid = grid.with_bounds(vec![-1.0, 1.0], vec![-1.0, 1.0]);
        assert_eq!(grid.axes(1e-9).unwrap().lon.cells, vec![(-1.0, 1.0)]);
    }

    #[test]
    fn resolution_uses_unwrapped_spacing() {
        let grid = Grid::rectilinear(&[350.0, 0.0, 10.0], &[0.0, 2.0, 4.0]);
        assert_eq!(grid.resolution(), (10.0, 2.0));
    }
}

//! Sparse transfer matrix between two lon/lat grids.

use super::area::{axis_overlaps, lat_overlap, lon_overlap, unit_cell_area};
use crate::config::RegridConfig;
use crate::data::Grid;
use crate::error::{ClimopsError, Result};
use ndarray::{Array2, ArrayView2};

/// One non-zero entry of a destination row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionEntry {
    /// Flat source cell index (`lon_index * n_lat + lat_index`).
    pub src: usize,
    /// Remap weight applied to the source value.
    pub weight: f64,
    /// Fraction of the source cell that lies inside the destination cell.
    pub fraction: f64,
}

/// Remap weights from every destination cell to the source cells it overlaps.
///
/// Row `d` lists `(s, w)` pairs with
/// `w = overlap(d, s) / area_geom(s) · src_area(s) / dst_area(d)`, so that
/// `Σ_d dst_area(d) · new(d) = Σ_s src_area(s) · val(s)` whenever the
/// destination grid covers the source grid. Zero overlaps are not stored and
/// destination cells outside the source grid have empty rows.
///
/// The matrix depends only on the two grids and their areas, so one instance
/// can be applied to any number of variables on the same grid pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionMatrix {
    src_shape: (usize, usize),
    dst_shape: (usize, usize),
    rows: Vec<Vec<ProjectionEntry>>,
}

impl ProjectionMatrix {
    /// Build the matrix for `src -> dst` using default tolerances.
    pub fn build(
        src: &Grid,
        src_area: &Array2<f64>,
        dst: &Grid,
        dst_area: &Array2<f64>,
    ) -> Result<Self> {
        Self::build_with_config(src, src_area, dst, dst_area, &RegridConfig::default())
    }

    /// Build the matrix for `src -> dst`.
    ///
    /// Fails with `InvalidGrid` for grids without usable cell boundaries,
    /// `Precondition` for area arrays of the wrong shape or with negative or
    /// non-finite entries, and `NoOverlap` when no cell pair intersects.
    pub fn build_with_config(
        src: &Grid,
        src_area: &Array2<f64>,
        dst: &Grid,
        dst_area: &Array2<f64>,
        config: &RegridConfig,
    ) -> Result<Self> {
        let tol = config.coordinate_tolerance;
        let src_axes = src.axes(tol)?;
        let dst_axes = dst.axes(tol)?;
        check_area("source", src_area, src.shape())?;
        check_area("destination", dst_area, dst.shape())?;

        let lon_pairs = axis_overlaps(&dst_axes.lon, &src_axes.lon, lon_overlap, tol);
        let lat_pairs = axis_overlaps(
            &dst_axes.lat,
            &src_axes.lat,
            |d, s| lat_overlap(d, s, tol),
            0.0,
        );

        let (src_nlon, src_nlat) = src.shape();
        let (dst_nlon, dst_nlat) = dst.shape();
        let mut rows = Vec::with_capacity(dst_nlon * dst_nlat);
        for i in 0..dst_nlon {
            for j in 0..dst_nlat {
                let mut row = Vec::new();
                let target_area = dst_area[[i, j]];
                if target_area > 0.0 {
                    for &(k, dlon) in &lon_pairs[i] {
                        for &(l, band) in &lat_pairs[j] {
                            let geom = unit_cell_area(src_axes.lon.cells[k], src_axes.lat.cells[l]);
                            if geom <= 0.0 {
                                continue;
                            }
                            let fraction = dlon.to_radians() * band / geom;
                            let weight = fraction * src_area[[k, l]] / target_area;
                            if weight > 0.0 {
                                row.push(ProjectionEntry {
                                    src: k * src_nlat + l,
                                    weight,
                                    fraction,
                                });
                            }
                        }
                    }
                }
                rows.push(row);
            }
        }

        let matrix = Self {
            src_shape: (src_nlon, src_nlat),
            dst_shape: (dst_nlon, dst_nlat),
            rows,
        };
        if matrix.nnz() == 0 {
            return Err(ClimopsError::no_overlap(format!(
                "no {}x{} destination cell intersects the {}x{} source grid",
                dst_nlon, dst_nlat, src_nlon, src_nlat
            )));
        }
        tracing::debug!(
            "projection {:?} -> {:?}: {} non-zero weights",
            matrix.src_shape,
            matrix.dst_shape,
            matrix.nnz()
        );
        Ok(matrix)
    }

    /// Source grid shape `(n_lon, n_lat)`.
    pub fn src_shape(&self) -> (usize, usize) {
        self.src_shape
    }

    /// Destination grid shape `(n_lon, n_lat)`.
    pub fn dst_shape(&self) -> (usize, usize) {
        self.dst_shape
    }

    /// Number of source cells.
    pub fn n_src(&self) -> usize {
        self.src_shape.0 * self.src_shape.1
    }

    /// Number of destination cells.
    pub fn n_dst(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored weights.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Entries of flat destination cell `d` (`lon_index * n_lat + lat_index`).
    pub fn row(&self, d: usize) -> &[ProjectionEntry] {
        self.rows.get(d).map(Vec::as_slice).unwrap_or_default()
    }

    /// Share of every source cell that ends up somewhere on the destination
    /// grid; 1 for source cells the destination grid fully covers.
    pub fn source_coverage(&self) -> Array2<f64> {
        let mut coverage = Array2::zeros(self.src_shape);
        let nlat = self.src_shape.1;
        for entry in self.rows.iter().flatten() {
            coverage[[entry.src / nlat, entry.src % nlat]] += entry.fraction;
        }
        coverage
    }

    /// Remap one 2-D source slice onto the destination grid.
    ///
    /// A destination cell is NaN when no source cell contributes to it or
    /// when any contributing source value is NaN.
    pub fn apply(&self, src: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if src.dim() != self.src_shape {
            return Err(ClimopsError::precondition(format!(
                "slice shape {:?} does not match projection source {:?}",
                src.dim(),
                self.src_shape
            )));
        }
        let nlat = self.src_shape.1;
        let dst_nlat = self.dst_shape.1;
        Ok(Array2::from_shape_fn(self.dst_shape, |(i, j)| {
            let row = &self.rows[i * dst_nlat + j];
            if row.is_empty() {
                return f64::NAN;
            }
            row.iter()
                .map(|e| e.weight * src[[e.src / nlat, e.src % nlat]])
                .sum()
        }))
    }
}

fn check_area(which: &str, area: &Array2<f64>, shape: (usize, usize)) -> Result<()> {
    if area.dim() != shape {
        return Err(ClimopsError::precondition(format!(
            "{} area shape {:?} does not match grid shape {:?}",
            which,
            area.dim(),
            shape
        )));
    }
    if area.iter().any(|a| !a.is_finite() || *a < 0.0) {
        return Err(ClimopsError::precondition(format!(
            "{} area contains negative or non-finite values",
            which
        )));
    }
    Ok(())
}

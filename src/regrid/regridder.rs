//! Conservative regridding of whole datasets.

use super::{GridArea, ProjectionMatrix};
use crate::config::{progress, RegridConfig};
use crate::data::{Dataset, Grid};
use crate::error::{ClimopsError, Result};
use ndarray::Array2;
use std::borrow::Cow;

/// Precomputed inputs a caller may hand to [`Regridder::regrid`].
///
/// Anything left as `None` is computed from the grids.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegridOptions<'a> {
    /// Cell areas of the dataset's grid.
    pub src_area: Option<&'a Array2<f64>>,
    /// Cell areas of the destination grid.
    pub dst_area: Option<&'a Array2<f64>>,
    /// A transfer matrix built for this grid pair.
    pub projection: Option<&'a ProjectionMatrix>,
}

/// Remaps datasets onto another lon/lat grid, preserving area-weighted totals.
#[derive(Debug, Clone, Default)]
pub struct Regridder {
    config: RegridConfig,
}

impl Regridder {
    /// Create a regridder.
    pub fn new(config: RegridConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &RegridConfig {
        &self.config
    }

    /// Build the transfer matrix for `src -> dst` from geometric cell areas.
    pub fn projection(&self, src: &Grid, dst: &Grid) -> Result<ProjectionMatrix> {
        let area = GridArea::from_config(&self.config);
        ProjectionMatrix::build_with_config(
            src,
            &area.compute(src)?,
            dst,
            &area.compute(dst)?,
            &self.config,
        )
    }

    /// Remap `dataset` onto `dst`.
    ///
    /// Every `(level, time)` slice is remapped independently with the same
    /// matrix. The result carries `dst` as its grid, keeps all other fields
    /// and gains one provenance entry.
    pub fn regrid(
        &self,
        dataset: &Dataset,
        dst: &Grid,
        options: RegridOptions<'_>,
    ) -> Result<Dataset> {
        dataset.validate()?;
        dst.axes(self.config.coordinate_tolerance)?;

        let matrix = match options.projection {
            Some(m) => {
                if m.src_shape() != dataset.grid.shape() || m.dst_shape() != dst.shape() {
                    return Err(ClimopsError::precondition(format!(
                        "projection maps {:?} -> {:?}, grids are {:?} -> {:?}",
                        m.src_shape(),
                        m.dst_shape(),
                        dataset.grid.shape(),
                        dst.shape()
                    )));
                }
                if m.nnz() == 0 {
                    return Err(ClimopsError::no_overlap("supplied projection is empty"));
                }
                Cow::Borrowed(m)
            }
            None => {
                let area = GridArea::from_config(&self.config);
                let src_area = match options.src_area {
                    Some(a) => Cow::Borrowed(a),
                    None => Cow::Owned(area.compute(&dataset.grid)?),
                };
                let dst_area = match options.dst_area {
                    Some(a) => Cow::Borrowed(a),
                    None => Cow::Owned(area.compute(dst)?),
                };
                Cow::Owned(ProjectionMatrix::build_with_config(
                    &dataset.grid,
                    &src_area,
                    dst,
                    &dst_area,
                    &self.config,
                )?)
            }
        };

        let ext = dataset.values.extents();
        progress!(
            self.config.verbose,
            "regridding {} ({} levels x {} steps) from {:?} to {:?}",
            dataset.variable,
            ext.lev,
            ext.time,
            dataset.grid.shape(),
            dst.shape()
        );
        let values = dataset.values.remap_with_weights(&matrix)?;

        let (nlon, nlat) = dst.shape();
        let (dlon, dlat) = dst.resolution();
        let mut provenance = dataset.provenance.clone();
        provenance.record(format!(
            "regrid: conservative remap of '{}' from {}x{} to {}x{} grid ({:.4} x {:.4} degrees)",
            dataset.variable,
            dataset.grid.shape().0,
            dataset.grid.shape().1,
            nlon,
            nlat,
            dlon,
            dlat
        ));

        Ok(Dataset {
            variable: dataset.variable.clone(),
            model: dataset.model.clone(),
            domain: dataset.domain.clone(),
            value_unit: dataset.value_unit.clone(),
            grid: dst.clone(),
            z: dataset.z.clone(),
            lev: dataset.lev.clone(),
            time: dataset.time.clone(),
            values,
            ensembles: dataset.ensembles.clone(),
            files: dataset.files.clone(),
            experiment: dataset.experiment.clone(),
            provenance,
            debug: dataset.debug.clone(),
        })
    }
}

/// Regrid with default settings, computing areas and the matrix.
pub fn regrid(dataset: &Dataset, dst: &Grid) -> Result<Dataset> {
    Regridder::default().regrid(dataset, dst, RegridOptions::default())
}

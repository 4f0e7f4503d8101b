//! Gridded values with interchangeable dense and tabular backings.
//!
//! Merging and regridding are written once against [`GriddedValues`]; the
//! backing only decides how cells are stored, never what they mean.

use super::table::{ValueRow, ValueTable};
use crate::error::{ClimopsError, Result};
use crate::regrid::ProjectionMatrix;
use ndarray::{s, Array2, Array3, Array4, Axis};

/// Sizes of the four value dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extents {
    /// Number of longitudes.
    pub lon: usize,
    /// Number of latitudes.
    pub lat: usize,
    /// Number of vertical levels.
    pub lev: usize,
    /// Number of time steps.
    pub time: usize,
}

impl Extents {
    /// Extents as an ndarray shape tuple.
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        (self.lon, self.lat, self.lev, self.time)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.lon * self.lat * self.lev * self.time
    }

    /// True when any dimension is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major offset of a cell, or `None` when out of range.
    pub fn flat_index(&self, lon: usize, lat: usize, lev: usize, time: usize) -> Option<usize> {
        if lon >= self.lon || lat >= self.lat || lev >= self.lev || time >= self.time {
            return None;
        }
        Some(((lon * self.lat + lat) * self.lev + lev) * self.time + time)
    }

    fn same_space(&self, other: &Extents) -> bool {
        self.lon == other.lon && self.lat == other.lat && self.lev == other.lev
    }
}

/// Values indexed `(lon, lat, level, time)`.
#[derive(Debug, Clone, PartialEq)]
pub enum GriddedValues {
    /// Dense 4-D array; NaN marks missing cells.
    Dense(Array4<f64>),
    /// Long-form table; absent rows and NaN values mark missing cells.
    Tabular(ValueTable),
}

impl GriddedValues {
    /// Sizes of the four dimensions.
    pub fn extents(&self) -> Extents {
        match self {
            Self::Dense(a) => {
                let (lon, lat, lev, time) = a.dim();
                Extents {
                    lon,
                    lat,
                    lev,
                    time,
                }
            }
            Self::Tabular(t) => t.extents(),
        }
    }

    /// True for the dense backing.
    pub fn is_dense(&self) -> bool {
        matches!(self, Self::Dense(_))
    }

    /// Dense copy of the values.
    pub fn to_dense(&self) -> Array4<f64> {
        match self {
            Self::Dense(a) => a.clone(),
            Self::Tabular(t) => t.to_dense(),
        }
    }

    /// Tabular copy of the values.
    pub fn to_tabular(&self) -> ValueTable {
        match self {
            Self::Dense(a) => ValueTable::from_dense(a),
            Self::Tabular(t) => t.clone(),
        }
    }

    /// Convert to the same backing as `like`.
    pub fn to_backing_of(&self, like: &GriddedValues) -> GriddedValues {
        match (self, like) {
            (Self::Tabular(t), Self::Dense(_)) => Self::Dense(t.to_dense()),
            (Self::Dense(a), Self::Tabular(_)) => Self::Tabular(ValueTable::from_dense(a)),
            _ => self.clone(),
        }
    }

    /// The `(lon, lat, lev)` cube at time index `t`.
    pub fn slice_time(&self, t: usize) -> Result<Array3<f64>> {
        let ext = self.extents();
        if t >= ext.time {
            return Err(ClimopsError::precondition(format!(
                "time index {} out of range for {} steps",
                t, ext.time
            )));
        }
        Ok(match self {
            Self::Dense(a) => a.index_axis(Axis(3), t).to_owned(),
            Self::Tabular(table) => {
                let mut cube = Array3::from_elem((ext.lon, ext.lat, ext.lev), f64::NAN);
                for row in table.rows().iter().filter(|r| r.time == t) {
                    cube[[row.lon, row.lat, row.lev]] = row.value;
                }
                cube
            }
        })
    }

    /// Append `other` after `self` along the time dimension.
    ///
    /// The result keeps `self`'s backing; `other` is converted if needed.
    pub fn concat_time(&self, other: &GriddedValues) -> Result<GriddedValues> {
        let (left, right) = (self.extents(), other.extents());
        if !left.same_space(&right) {
            return Err(ClimopsError::precondition(format!(
                "cannot concatenate values with extents {:?} and {:?}",
                left, right
            )));
        }
        match (self, other.to_backing_of(self)) {
            (Self::Dense(a), Self::Dense(b)) => {
                Ok(Self::Dense(ndarray::concatenate(Axis(3), &[a.view(), b.view()])?))
            }
            (Self::Tabular(a), Self::Tabular(b)) => {
                let shift = left.time;
                let rows = a
                    .rows()
                    .iter()
                    .copied()
                    .chain(b.rows().iter().map(|r| ValueRow {
                        time: r.time + shift,
                        ..*r
                    }))
                    .collect();
                let extents = Extents {
                    time: left.time + right.time,
                    ..left
                };
                Ok(Self::Tabular(ValueTable::from_parts_unchecked(extents, rows)))
            }
            _ => Err(ClimopsError::precondition("backing conversion failed")),
        }
    }

    /// Apply `matrix` to every `(level, time)` slice independently.
    pub fn remap_with_weights(&self, matrix: &ProjectionMatrix) -> Result<GriddedValues> {
        let ext = self.extents();
        if (ext.lon, ext.lat) != matrix.src_shape() {
            return Err(ClimopsError::precondition(format!(
                "values have spatial shape {:?}, projection expects {:?}",
                (ext.lon, ext.lat),
                matrix.src_shape()
            )));
        }
        let (dst_lon, dst_lat) = matrix.dst_shape();

        match self {
            Self::Dense(a) => {
                let mut out = Array4::from_elem((dst_lon, dst_lat, ext.lev, ext.time), f64::NAN);
                for t in 0..ext.time {
                    for k in 0..ext.lev {
                        let remapped = matrix.apply(a.slice(s![.., .., k, t]))?;
                        out.slice_mut(s![.., .., k, t]).assign(&remapped);
                    }
                }
                Ok(Self::Dense(out))
            }
            Self::Tabular(table) => {
                let mut order: Vec<&ValueRow> = table.rows().iter().collect();
                order.sort_by_key(|r| (r.time, r.lev));

                let mut rows = Vec::new();
                for group in order.chunk_by(|a, b| (a.time, a.lev) == (b.time, b.lev)) {
                    let (t, k) = (group[0].time, group[0].lev);
                    let mut slice = Array2::from_elem((ext.lon, ext.lat), f64::NAN);
                    for row in group {
                        slice[[row.lon, row.lat]] = row.value;
                    }
                    let remapped = matrix.apply(slice.view())?;
                    rows.extend(
                        remapped
                            .indexed_iter()
                            .filter(|(_, v)| !v.is_nan())
                            .map(|((i, j), &value)| ValueRow {
                                lon: i,
                                lat: j,
                                lev: k,
                                time: t,
                                value,
                            }),
                    );
                }
                let extents = Extents {
                    lon: dst_lon,
                    lat: dst_lat,
                    ..ext
                };
                Ok(Self::Tabular(ValueTable::from_parts_unchecked(extents, rows)))
            }
        }
    }

    /// Area-weighted sum of one `(level, time)` slice, skipping missing cells.
    pub fn weighted_sum(&self, area: &Array2<f64>, lev: usize, t: usize) -> Result<f64> {
        let ext = self.extents();
        if area.dim() != (ext.lon, ext.lat) {
            return Err(ClimopsError::precondition(format!(
                "area shape {:?} does not match values {:?}",
                area.dim(),
                (ext.lon, ext.lat)
            )));
        }
        if lev >= ext.lev || t >= ext.time {
            return Err(ClimopsError::precondition(format!(
                "slice ({}, {}) out of range for {:?}",
                lev, t, ext
            )));
        }
        let sum: f64 = match self {
            Self::Dense(a) => a
                .slice(s![.., .., lev, t])
                .indexed_iter()
                .filter(|(_, v)| !v.is_nan())
                .map(|((i, j), v)| v * area[[i, j]])
                .sum(),
            Self::Tabular(table) => table
                .rows()
                .iter()
                .filter(|r| r.lev == lev && r.time == t && !r.value.is_nan())
                .map(|r| r.value * area[[r.lon, r.lat]])
                .sum(),
        };
        Ok(sum)
    }

    /// Compare cell by cell regardless of backing; missing equals missing.
    pub fn logically_eq(&self, other: &GriddedValues) -> bool {
        if self.extents() != other.extents() {
            return false;
        }
        self.to_dense()
            .iter()
            .zip(other.to_dense().iter())
            .all(|(a, b)| (a.is_nan() && b.is_nan()) || a == b)
    }
}

impl From<Array4<f64>> for GriddedValues {
    fn from(values: Array4<f64>) -> Self {
        Self::Dense(values)
    }
}

impl From<ValueTable> for GriddedValues {
    fn from(table: ValueTable) -> Self {
        Self::Tabular(table)
    }
}

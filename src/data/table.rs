//! Long-form (tabular) storage of gridded values.

use super::values::Extents;
use crate::error::{ClimopsError, Result};
use ndarray::Array4;

/// One observation of the long-form table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRow {
    /// Longitude index.
    pub lon: usize,
    /// Latitude index.
    pub lat: usize,
    /// Vertical level index.
    pub lev: usize,
    /// Time index.
    pub time: usize,
    /// The value; NaN counts as missing.
    pub value: f64,
}

/// Values stored as a list of `(lon, lat, lev, time, value)` rows.
///
/// Cells without a row are missing, exactly like NaN cells of a dense array.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    extents: Extents,
    rows: Vec<ValueRow>,
}

impl ValueTable {
    /// Create a table, checking that every row fits `extents` and that no
    /// cell appears twice.
    pub fn new(extents: Extents, rows: Vec<ValueRow>) -> Result<Self> {
        let mut seen = vec![false; extents.len()];
        for row in &rows {
            let flat = extents.flat_index(row.lon, row.lat, row.lev, row.time).ok_or_else(|| {
                ClimopsError::precondition(format!(
                    "row ({}, {}, {}, {}) lies outside extents {:?}",
                    row.lon, row.lat, row.lev, row.time, extents
                ))
            })?;
            if std::mem::replace(&mut seen[flat], true) {
                return Err(ClimopsError::precondition(format!(
                    "duplicate row for cell ({}, {}, {}, {})",
                    row.lon, row.lat, row.lev, row.time
                )));
            }
        }
        Ok(Self { extents, rows })
    }

    /// Build a table from a dense array, dropping missing cells.
    pub fn from_dense(values: &Array4<f64>) -> Self {
        let (lon, lat, lev, time) = values.dim();
        let rows = values
            .indexed_iter()
            .filter(|(_, v)| !v.is_nan())
            .map(|((i, j, k, t), &value)| ValueRow {
                lon: i,
                lat: j,
                lev: k,
                time: t,
                value,
            })
            .collect();
        Self {
            extents: Extents {
                lon,
                lat,
                lev,
                time,
            },
            rows,
        }
    }

    /// Expand into a dense array with NaN for missing cells.
    pub fn to_dense(&self) -> Array4<f64> {
        let mut out = Array4::from_elem(self.extents.dim(), f64::NAN);
        for row in &self.rows {
            out[[row.lon, row.lat, row.lev, row.time]] = row.value;
        }
        out
    }

    /// Declared extents.
    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// All rows in storage order.
    pub fn rows(&self) -> &[ValueRow] {
        &self.rows
    }

    pub(crate) fn from_parts_unchecked(extents: Extents, rows: Vec<ValueRow>) -> Self {
        Self { extents, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extents() -> Extents {
        Extents {
            lon: 2,
            lat: 1,
            lev: 1,
            time: 2,
        }
    }

    fn row(lon: usize, time: usize, value: f64) -> ValueRow {
        ValueRow {
            lon,
            lat: 0,
            lev: 0,
            time,
            value,
        }
    }

    #[test]
    fn rejects_out_of_range_rows() {
        let result = ValueTable::new(extents(), vec![row(2, 0, 1.0)]);
        assert!(matches!(result, Err(ClimopsError::Precondition(_))));
    }

    #[test]
    fn rejects_duplicate_cells() {
        let result = ValueTable::new(extents(), vec![row(0, 0, 1.0), row(0, 0, 2.0)]);
        assert!(matches!(result, Err(ClimopsError::Precondition(_))));
    }

    #[test]
    fn absent_rows_become_nan() {
        let table = ValueTable::new(extents(), vec![row(1, 1, 4.0)]).unwrap();
        let dense = table.to_dense();
        assert_eq!(dense[[1, 0, 0, 1]], 4.0);
        assert!(dense[[0, 0, 0, 0]].is_nan());
    }

    #[test]
    fn from_dense_skips_nan() {
        let mut dense = Array4::from_elem((2, 1, 1, 2), 1.0);
        dense[[0, 0, 0, 1]] = f64::NAN;
        let table = ValueTable::from_dense(&dense);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.extents(), extents());
    }
}

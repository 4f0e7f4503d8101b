//! The dataset value object consumed and produced by every operation.

use super::grid::Grid;
use super::values::GriddedValues;
use crate::error::{ClimopsError, Result};

/// Append-only log of the operations applied to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance(Vec<String>);

impl Provenance {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&mut self, entry: impl Into<String>) {
        self.0.push(entry.into());
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Provenance {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Bookkeeping carried alongside the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    /// Nominal time frequency label ("mon", "day", ...).
    pub time_freq_str: String,
}

/// A gridded climate variable with its coordinates and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Variable name, e.g. "tas".
    pub variable: String,
    /// Producing model.
    pub model: String,
    /// Model domain.
    pub domain: String,
    /// Unit of the values.
    pub value_unit: String,
    /// Cell-center coordinates.
    pub grid: Grid,
    /// Vertical coordinate description.
    pub z: Option<String>,
    /// Vertical level values.
    pub lev: Option<Vec<f64>>,
    /// Time stamps, ascending.
    pub time: Vec<f64>,
    /// The data, indexed `(lon, lat, level, time)`.
    pub values: GriddedValues,
    /// Ensemble member labels.
    pub ensembles: Vec<String>,
    /// Source identifiers.
    pub files: Vec<String>,
    /// Experiment name.
    pub experiment: String,
    /// Operations applied so far.
    pub provenance: Provenance,
    /// Extra bookkeeping.
    pub debug: DebugInfo,
}

impl Dataset {
    /// Create a dataset with empty metadata.
    pub fn new(
        variable: impl Into<String>,
        grid: Grid,
        time: Vec<f64>,
        values: impl Into<GriddedValues>,
    ) -> Self {
        Self {
            variable: variable.into(),
            model: String::new(),
            domain: String::new(),
            value_unit: String::new(),
            grid,
            z: None,
            lev: None,
            time,
            values: values.into(),
            ensembles: Vec::new(),
            files: Vec::new(),
            experiment: String::new(),
            provenance: Provenance::new(),
            debug: DebugInfo::default(),
        }
    }

    /// Check the structural invariants every operation relies on.
    pub fn validate(&self) -> Result<()> {
        let ext = self.values.extents();
        if self.grid.lon.dim() != self.grid.lat.dim() {
            return Err(ClimopsError::precondition(format!(
                "lon shape {:?} does not match lat shape {:?}",
                self.grid.lon.dim(),
                self.grid.lat.dim()
            )));
        }
        if self.grid.shape() != (ext.lon, ext.lat) {
            return Err(ClimopsError::precondition(format!(
                "grid shape {:?} does not match value extents {:?}",
                self.grid.shape(),
                (ext.lon, ext.lat)
            )));
        }
        if self.time.is_empty() {
            return Err(ClimopsError::precondition("time axis is empty"));
        }
        if self.time.len() != ext.time {
            return Err(ClimopsError::precondition(format!(
                "{} time stamps but {} time steps of values",
                self.time.len(),
                ext.time
            )));
        }
        if self.time.iter().any(|t| !t.is_finite()) {
            return Err(ClimopsError::precondition("non-finite time stamp"));
        }
        if self.time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ClimopsError::precondition(
                "time stamps are not strictly ascending",
            ));
        }
        if let Some(lev) = &self.lev {
            if lev.len() != ext.lev {
                return Err(ClimopsError::precondition(format!(
                    "{} levels declared but values have {}",
                    lev.len(),
                    ext.lev
                )));
            }
        }
        if ext.lev == 0 {
            return Err(ClimopsError::precondition("values have no level"));
        }
        Ok(())
    }

    /// Mean of the time stamps.
    pub fn mean_time(&self) -> f64 {
        self.time.iter().sum::<f64>() / self.time.len() as f64
    }

    /// Internal time step `time[1] - time[0]`, if there are two stamps.
    pub fn time_step(&self) -> Option<f64> {
        match self.time.as_slice() {
            [a, b, ..] => Some(b - a),
            _ => None,
        }
    }

    /// First and last time stamp.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((*self.time.first()?, *self.time.last()?))
    }
}

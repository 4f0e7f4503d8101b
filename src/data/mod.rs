//! Dataset representation.
//!
//! This module holds the value object that merging and regridding consume
//! and produce: coordinates, metadata and the gridded values themselves.

mod dataset;
mod grid;
mod table;
mod values;

pub use dataset::{Dataset, DebugInfo, Provenance};
pub use grid::{CellAxis, Grid, GridAxes};
pub use table::{ValueRow, ValueTable};
pub use values::{Extents, GriddedValues};

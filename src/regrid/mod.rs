//! Conservative spatial regridding.
//!
//! Regridding runs in three steps, each usable on its own:
//!
//! 1. [`GridArea`] turns cell centers (or explicit edges) into cell areas.
//! 2. [`ProjectionMatrix`] stores, per destination cell, the overlapping
//!    source cells and their weights.
//! 3. [`Regridder`] applies the matrix to every `(level, time)` slice.

mod area;
mod projection;
mod regridder;

pub use area::{compute_cell_area, GridArea};
pub use projection::{ProjectionEntry, ProjectionMatrix};
pub use regridder::{regrid, RegridOptions, Regridder};

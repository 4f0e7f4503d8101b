//! Climops - merging and conservative regridding of climate-model datasets.
//!
//! Climops works on [`data::Dataset`] values: gridded variables indexed by
//! longitude, latitude, vertical level and time, together with their
//! identifying metadata and an append-only provenance log. Loading and
//! writing files is left to the caller.
//!
//! # Features
//!
//! - Merge two temporally adjacent experiments into one time series, with
//!   identity, frequency, overlap and gap checks
//! - Cell areas of lon/lat grids, including polar and date-line cells
//! - Sparse transfer matrices reusable across variables
//! - Conservative regridding that preserves area-weighted totals
//! - Dense and long-form (tabular) value storage behind one abstraction
//!
//! # Example
//!
//! ```
//! use climops::merge::merge;
//! use climops::synthetic::{experiment, global_grid, time_axis};
//!
//! let hist = experiment(global_grid(8, 4), "historical", time_axis(0.0, 1.0, 12), false);
//! let future = experiment(global_grid(8, 4), "rcp85", time_axis(12.0, 1.0, 12), false);
//!
//! let outcome = merge(&future, &hist)?;
//! assert!(outcome.is_clean());
//! assert_eq!(outcome.value.experiment, "historical.rcp85");
//! assert_eq!(outcome.value.time.len(), 24);
//! # Ok::<(), climops::ClimopsError>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod merge;
pub mod regrid;
pub mod synthetic;

pub use config::{Config, MergeConfig, RegridConfig};
pub use data::{Dataset, Grid, GriddedValues};
pub use diagnostics::{Diagnostic, Outcome};
pub use error::{ClimopsError, Result};
pub use merge::ExperimentMerger;
pub use regrid::{GridArea, ProjectionMatrix, Regridder};

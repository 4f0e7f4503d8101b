//! Merging two experiments into one continuous time series.
//!
//! [`ExperimentMerger`] orders the two datasets, then runs the fatal
//! identity, frequency and overlap checks, and only then raises ensemble and
//! gap diagnostics before concatenating. Ordering is a separate
//! [`TimeOrdering`] policy so it can be tested and replaced on its own.

mod merger;
mod ordering;

pub use merger::{merge, ExperimentMerger};
pub use ordering::{MeanTimeOrdering, TimeOrdering};

//! Error types for Climops.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Every variant is fatal: an operation that returns one of these has produced
//! no partial result. Non-fatal conditions live in [`crate::diagnostics`].

use thiserror::Error;

/// Result type alias for Climops operations.
pub type Result<T> = std::result::Result<T, ClimopsError>;

/// Errors that can occur while merging or regridding datasets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClimopsError {
    /// A dataset or argument does not have the required type or shape.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Identity or frequency metadata differs between two datasets.
    #[error("incompatible datasets: {field} differs ({detail})")]
    IncompatibleDataset {
        /// Name of the mismatching field.
        field: &'static str,
        /// Human-readable description of both values.
        detail: String,
    },

    /// The time axes of two datasets overlap or cannot be separated.
    #[error(
        "time axes overlap: left ends at {left_max}, right starts at {right_min} \
         ({shared} shared time stamps)"
    )]
    TimeOverlap {
        /// Last time stamp of the earlier dataset.
        left_max: f64,
        /// First time stamp of the later dataset.
        right_min: f64,
        /// Number of time stamps present in both datasets.
        shared: usize,
    },

    /// Grid coordinates cannot be turned into cell boundaries.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Source and destination grids do not intersect.
    #[error("grids do not overlap: {0}")]
    NoOverlap(String),
}

impl ClimopsError {
    /// Create a Precondition error.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create an IncompatibleDataset error.
    pub fn incompatible(field: &'static str, detail: impl Into<String>) -> Self {
        Self::IncompatibleDataset {
            field,
            detail: detail.into(),
        }
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create a NoOverlap error.
    pub fn no_overlap(msg: impl Into<String>) -> Self {
        Self::NoOverlap(msg.into())
    }
}

impl From<ndarray::ShapeError> for ClimopsError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Precondition(format!("array shape: {}", err))
    }
}

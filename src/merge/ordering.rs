//! Deciding which of two datasets comes first in time.

use crate::data::Dataset;
use std::fmt::Debug;

/// Policy that puts two datasets in chronological order before merging.
pub trait TimeOrdering: Debug + Send + Sync {
    /// True when `y` should be the left (earlier) operand instead of `x`.
    fn should_swap(&self, x: &Dataset, y: &Dataset) -> bool;

    /// Return `(earlier, later)`.
    fn order<'a>(&self, x: &'a Dataset, y: &'a Dataset) -> (&'a Dataset, &'a Dataset) {
        if self.should_swap(x, y) {
            (y, x)
        } else {
            (x, y)
        }
    }
}

/// Orders by the mean of each time axis; ties keep argument order.
///
/// This is a heuristic. It sorts non-overlapping series correctly but says
/// nothing about interleaved ones, which the overlap check rejects later.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanTimeOrdering;

impl TimeOrdering for MeanTimeOrdering {
    fn should_swap(&self, x: &Dataset, y: &Dataset) -> bool {
        y.mean_time() < x.mean_time()
    }
}

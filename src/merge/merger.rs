//! Joining two temporally adjacent experiments into one time series.

use super::ordering::{MeanTimeOrdering, TimeOrdering};
use crate::config::{progress, MergeConfig};
use crate::data::Dataset;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Outcome};
use crate::error::{ClimopsError, Result};
use std::fmt::Debug;

/// Validates and concatenates two datasets along time.
///
/// Every fatal check runs before any data is copied, so a failed merge
/// never yields a partial dataset.
#[derive(Debug)]
pub struct ExperimentMerger {
    config: MergeConfig,
    ordering: Box<dyn TimeOrdering>,
}

impl Default for ExperimentMerger {
    fn default() -> Self {
        Self::new(MergeConfig::default())
    }
}

impl ExperimentMerger {
    /// Create a merger that orders operands by mean time.
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            ordering: Box::new(MeanTimeOrdering),
        }
    }

    /// Replace the ordering policy.
    pub fn with_ordering(mut self, ordering: impl TimeOrdering + 'static) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge `x` and `y` into one dataset, in whichever order is chronological.
    pub fn merge(&self, x: &Dataset, y: &Dataset) -> Result<Outcome<Dataset>> {
        x.validate()?;
        y.validate()?;
        let (left, right) = self.ordering.order(x, y);
        progress!(
            self.config.verbose,
            "merging {} ({} steps) with {} ({} steps)",
            left.experiment,
            left.time.len(),
            right.experiment,
            right.time.len()
        );

        check_identity(left, right)?;
        check_frequency(left, right)?;

        self.check_overlap(left, right)?;

        let mut sink = DiagnosticSink::default();
        if left.ensembles != right.ensembles {
            sink.raise(Diagnostic::EnsembleMismatch {
                left: left.ensembles.clone(),
                right: right.ensembles.clone(),
            });
        }
        self.check_gap(left, right, &mut sink);

        let merged = self.combine(left, right)?;
        progress!(
            self.config.verbose,
            "merged {}: {} time steps",
            merged.experiment,
            merged.time.len()
        );
        Ok(sink.finish(merged))
    }

    fn check_overlap(&self, left: &Dataset, right: &Dataset) -> Result<()> {
        let tol = self.config.time_tolerance;
        let (_, left_max) = left.time_range().unwrap_or_default();
        let (right_min, _) = right.time_range().unwrap_or_default();
        let shared = count_shared(&left.time, &right.time, tol);
        if shared > 0 || right_min - left_max <= tol {
            return Err(ClimopsError::TimeOverlap {
                left_max,
                right_min,
                shared,
            });
        }
        Ok(())
    }

    fn check_gap(&self, left: &Dataset, right: &Dataset, sink: &mut DiagnosticSink) {
        let tol = self.config.time_tolerance;
        let (_, left_max) = left.time_range().unwrap_or_default();
        let (right_min, _) = right.time_range().unwrap_or_default();
        let gap = right_min - left_max;

        let left_step = left.time_step();
        let right_step = right.time_step();
        for (ds, step) in [(left, left_step), (right, right_step)] {
            if step.is_none() {
                sink.raise(Diagnostic::UnknownTimeStep {
                    experiment: ds.experiment.clone(),
                });
            }
        }

        // Only a gap of exactly one step counts as contiguous; multiples of
        // the step (missing periods) are reported too.
        let plausible = [left_step, right_step]
            .into_iter()
            .flatten()
            .all(|step| (gap - step).abs() <= tol);
        if !plausible {
            sink.raise(Diagnostic::ImplausibleGap {
                gap,
                left_step,
                right_step,
            });
        }
    }

    fn combine(&self, left: &Dataset, right: &Dataset) -> Result<Dataset> {
        let values = left.values.concat_time(&right.values)?;

        let mut time = Vec::with_capacity(left.time.len() + right.time.len());
        time.extend_from_slice(&left.time);
        time.extend_from_slice(&right.time);

        let experiment = format!(
            "{}{}{}",
            left.experiment, self.config.experiment_separator, right.experiment
        );

        let mut provenance = left.provenance.clone();
        if !right.provenance.is_empty() {
            provenance.record(format!(
                "merge input '{}': {}",
                right.experiment,
                right.provenance.entries().join("; ")
            ));
        }
        provenance.record(describe_merge(left, right));

        Ok(Dataset {
            variable: left.variable.clone(),
            model: left.model.clone(),
            domain: left.domain.clone(),
            value_unit: left.value_unit.clone(),
            grid: left.grid.clone(),
            z: left.z.clone(),
            lev: left.lev.clone(),
            time,
            values,
            ensembles: merge_ensembles(left, right),
            files: left.files.iter().chain(&right.files).cloned().collect(),
            experiment,
            provenance,
            debug: left.debug.clone(),
        })
    }
}

/// Merge with default settings.
pub fn merge(x: &Dataset, y: &Dataset) -> Result<Outcome<Dataset>> {
    ExperimentMerger::default().merge(x, y)
}

fn check_identity(left: &Dataset, right: &Dataset) -> Result<()> {
    same("domain", &left.domain, &right.domain)?;
    same("variable", &left.variable, &right.variable)?;
    same("model", &left.model, &right.model)?;
    same("valueUnit", &left.value_unit, &right.value_unit)?;
    same(
        "lon",
        &(&left.grid.lon, &left.grid.lon_bounds),
        &(&right.grid.lon, &right.grid.lon_bounds),
    )?;
    same(
        "lat",
        &(&left.grid.lat, &left.grid.lat_bounds),
        &(&right.grid.lat, &right.grid.lat_bounds),
    )?;
    same("Z", &left.z, &right.z)?;
    same("lev", &left.lev, &right.lev)?;
    same(
        "lev",
        &left.values.extents().lev,
        &right.values.extents().lev,
    )
}

fn check_frequency(left: &Dataset, right: &Dataset) -> Result<()> {
    same(
        "timeFreqStr",
        &left.debug.time_freq_str,
        &right.debug.time_freq_str,
    )
}

fn same<T: PartialEq + Debug + ?Sized>(field: &'static str, left: &T, right: &T) -> Result<()> {
    if left == right {
        return Ok(());
    }
    let detail = format!("{:?} vs {:?}", left, right);
    // Coordinate arrays print huge; keep the message readable.
    let detail = if detail.len() > 200 {
        format!("{}...", &detail[..detail.char_indices().nth(200).map_or(0, |(i, _)| i)])
    } else {
        detail
    };
    Err(ClimopsError::incompatible(field, detail))
}

/// Number of stamps of sorted `a` that also occur in sorted `b`.
fn count_shared(a: &[f64], b: &[f64], tol: f64) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        if (a[i] - b[j]).abs() <= tol {
            shared += 1;
            i += 1;
            j += 1;
        } else if a[i] < b[j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    shared
}

fn merge_ensembles(left: &Dataset, right: &Dataset) -> Vec<String> {
    let per_step = left.ensembles.len() == left.time.len()
        && right.ensembles.len() == right.time.len()
        && !left.ensembles.is_empty();
    if per_step {
        return left.ensembles.iter().chain(&right.ensembles).cloned().collect();
    }
    let mut labels = left.ensembles.clone();
    for label in &right.ensembles {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    labels
}

fn describe_merge(left: &Dataset, right: &Dataset) -> String {
    let (l0, l1) = left.time_range().unwrap_or_default();
    let (r0, r1) = right.time_range().unwrap_or_default();
    format!(
        "merge: '{}' [{} .. {}, {} steps] + '{}' [{} .. {}, {} steps]",
        left.experiment,
        l0,
        l1,
        left.time.len(),
        right.experiment,
        r0,
        r1,
        right.time.len()
    )
}

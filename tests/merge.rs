//! Integration tests for merging experiments.

mod common;

use climops::merge::{merge, TimeOrdering};
use climops::{ClimopsError, Dataset, Diagnostic, ExperimentMerger, MergeConfig};
use common::{dataset, tabular};
use ndarray::{s, Array2};

// =============================================================================
// Fatal checks
// =============================================================================

#[test]
fn variable_mismatch_is_incompatible() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let mut y = dataset("rcp85", vec![3.0, 4.0]);
    y.variable = "pr".to_string();

    let err = merge(&x, &y).unwrap_err();
    assert!(matches!(
        err,
        ClimopsError::IncompatibleDataset {
            field: "variable",
            ..
        }
    ));
}

#[test]
fn every_identity_field_is_checked() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let cases: Vec<(&str, Box<dyn Fn(&mut Dataset)>)> = vec![
        ("domain", Box::new(|d: &mut Dataset| d.domain = "AFR-44".into())),
        ("model", Box::new(|d: &mut Dataset| d.model = "CanESM2".into())),
        ("valueUnit", Box::new(|d: &mut Dataset| d.value_unit = "degC".into())),
        ("lon", Box::new(|d: &mut Dataset| d.grid.lon += 0.25)),
        ("lat", Box::new(|d: &mut Dataset| d.grid.lat += 0.25)),
        ("Z", Box::new(|d: &mut Dataset| d.z = Some("height: 2 m".into()))),
        ("lev", Box::new(|d: &mut Dataset| d.lev = Some(vec![1000.0]))),
        ("timeFreqStr", Box::new(|d: &mut Dataset| d.debug.time_freq_str = "day".into())),
    ];
    for (field, mutate) in cases {
        let mut y = dataset("rcp85", vec![3.0, 4.0]);
        mutate(&mut y);
        match merge(&x, &y) {
            Err(ClimopsError::IncompatibleDataset { field: f, .. }) => assert_eq!(f, field),
            other => panic!("{}: expected IncompatibleDataset, got {:?}", field, other),
        }
    }
}

#[test]
fn shared_time_stamps_overlap() {
    let x = dataset("historical", vec![1.0, 2.0, 3.0]);
    let y = dataset("rcp85", vec![2.0, 3.0, 4.0]);
    let err = merge(&x, &y).unwrap_err();
    assert_eq!(
        err,
        ClimopsError::TimeOverlap {
            left_max: 3.0,
            right_min: 2.0,
            shared: 2
        }
    );
}

#[test]
fn interleaved_series_overlap() {
    let x = dataset("historical", vec![1.0, 3.0]);
    let y = dataset("rcp85", vec![2.0, 4.0]);
    assert!(matches!(
        merge(&x, &y),
        Err(ClimopsError::TimeOverlap { shared: 0, .. })
    ));
}

#[test]
fn malformed_dataset_is_precondition_error() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let mut y = dataset("rcp85", vec![3.0, 4.0]);
    y.time.push(5.0);
    assert!(matches!(
        merge(&x, &y),
        Err(ClimopsError::Precondition(_))
    ));
}

// =============================================================================
// Ordering and concatenation
// =============================================================================

#[test]
fn argument_order_does_not_matter() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp85", vec![3.0, 4.0]);
    assert_eq!(merge(&x, &y).unwrap(), merge(&y, &x).unwrap());
}

#[test]
fn concatenates_time_values_and_files() {
    let x = dataset("x", vec![1.0, 2.0]);
    let y = dataset("y", vec![3.0, 4.0]);
    let outcome = merge(&x, &y).unwrap();
    assert!(outcome.is_clean());

    let merged = outcome.value;
    assert_eq!(merged.time, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(merged.experiment, "x.y");
    assert_eq!(merged.files, vec!["x.nc", "y.nc"]);
    assert!(merged.validate().is_ok());

    let values = merged.values.to_dense();
    assert_eq!(values.dim(), (2, 3, 1, 4));
    assert_eq!(values.slice(s![.., .., .., 0..2]), x.values.to_dense());
    assert_eq!(values.slice(s![.., .., .., 2..4]), y.values.to_dense());
}

#[test]
fn provenance_records_the_merge() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp85", vec![3.0, 4.0]);
    let merged = merge(&y, &x).unwrap().value;
    let entries = merged.provenance.entries();
    assert_eq!(entries[0], "loaded historical");
    assert!(entries[1].contains("rcp85") && entries[1].contains("loaded rcp85"));
    assert!(entries[2].starts_with("merge: 'historical'"));
}

#[test]
fn tabular_merge_matches_dense_merge() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp85", vec![3.0, 4.0]);
    let dense = merge(&x, &y).unwrap().value;
    let table = merge(&tabular(x), &tabular(y)).unwrap().value;
    assert!(!table.values.is_dense());
    assert!(dense.values.logically_eq(&table.values));
    assert_eq!(dense.time, table.time);
}

#[test]
fn mixed_backings_follow_the_earlier_dataset() {
    let x = tabular(dataset("historical", vec![1.0, 2.0]));
    let y = dataset("rcp85", vec![3.0, 4.0]);
    let merged = merge(&y, &x).unwrap().value;
    assert!(!merged.values.is_dense());
    assert_eq!(merged.values.extents().time, 4);
}

#[test]
fn custom_separator() {
    let merger = ExperimentMerger::new(MergeConfig::default().with_separator("+"));
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp45", vec![3.0, 4.0]);
    assert_eq!(merger.merge(&x, &y).unwrap().value.experiment, "historical+rcp45");
}

#[derive(Debug)]
struct KeepArgumentOrder;

impl TimeOrdering for KeepArgumentOrder {
    fn should_swap(&self, _x: &Dataset, _y: &Dataset) -> bool {
        false
    }
}

#[test]
fn ordering_policy_is_replaceable() {
    let merger = ExperimentMerger::default().with_ordering(KeepArgumentOrder);
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp85", vec![3.0, 4.0]);
    assert!(merger.merge(&x, &y).is_ok());
    assert!(matches!(
        merger.merge(&y, &x),
        Err(ClimopsError::TimeOverlap { .. })
    ));
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn gap_larger_than_step_is_flagged() {
    let x = dataset("x", vec![1.0, 2.0]);
    let y = dataset("y", vec![4.0, 5.0]);
    let outcome = merge(&x, &y).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![Diagnostic::ImplausibleGap {
            gap: 2.0,
            left_step: Some(1.0),
            right_step: Some(1.0),
        }]
    );
    assert_eq!(outcome.value.time, vec![1.0, 2.0, 4.0, 5.0]);
}

#[test]
fn gap_must_match_both_steps() {
    let x = dataset("x", vec![1.0, 2.0]);
    let y = dataset("y", vec![3.0, 5.0]);
    let outcome = merge(&x, &y).unwrap();
    assert!(matches!(
        outcome.diagnostics.as_slice(),
        [Diagnostic::ImplausibleGap { gap, .. }] if *gap == 1.0
    ));
}

#[test]
fn ensemble_mismatch_is_flagged_not_fatal() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let mut y = dataset("rcp85", vec![3.0, 4.0]);
    y.ensembles = vec!["r2i1p1".to_string()];
    let outcome = merge(&x, &y).unwrap();
    assert!(matches!(
        outcome.diagnostics.as_slice(),
        [Diagnostic::EnsembleMismatch { .. }]
    ));
    assert_eq!(outcome.value.ensembles, vec!["r1i1p1", "r2i1p1"]);
}

#[test]
fn per_step_ensembles_are_concatenated() {
    let mut x = dataset("historical", vec![1.0, 2.0]);
    let mut y = dataset("rcp85", vec![3.0, 4.0]);
    x.ensembles = vec!["r1".into(), "r1".into()];
    y.ensembles = vec!["r1".into(), "r2".into()];
    let outcome = merge(&x, &y).unwrap();
    assert_eq!(outcome.value.ensembles, vec!["r1", "r1", "r1", "r2"]);
}

#[test]
fn single_step_dataset_has_unknown_step() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp85", vec![3.0]);
    let outcome = merge(&x, &y).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![Diagnostic::UnknownTimeStep {
            experiment: "rcp85".to_string()
        }]
    );
}

#[test]
fn multi_level_values_are_preserved() {
    let mut x = dataset("historical", vec![1.0, 2.0]);
    let mut y = dataset("rcp85", vec![3.0, 4.0]);
    for ds in [&mut x, &mut y] {
        let base = ds.values.to_dense();
        let stacked = ndarray::concatenate(ndarray::Axis(2), &[base.view(), (&base + 0.5).view()])
            .unwrap();
        ds.values = stacked.into();
        ds.lev = Some(vec![1000.0, 850.0]);
    }
    let merged = merge(&x, &y).unwrap().value;
    let values = merged.values.to_dense();
    assert_eq!(values.dim(), (2, 3, 2, 4));
    assert_eq!(values[[1, 2, 1, 3]], 4000.0 + 10.0 + 2.0 + 0.5);
    let cube = merged.values.slice_time(2).unwrap();
    assert_eq!(cube.slice(s![.., .., 0]), Array2::from_shape_fn((2, 3), |(i, j)| {
        3000.0 + 10.0 * i as f64 + j as f64
    }));
}

// =============================================================================
// Time tolerance
// =============================================================================

#[test]
fn gap_tolerance_is_configurable() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp85", vec![3.0 + 1e-4, 4.0 + 1e-4]);

    let strict = merge(&x, &y).unwrap();
    assert!(matches!(
        strict.diagnostics.as_slice(),
        [Diagnostic::ImplausibleGap { .. }]
    ));

    let merger = ExperimentMerger::new(MergeConfig::default().with_time_tolerance(1e-3));
    assert_eq!(merger.config().time_tolerance, 1e-3);
    let relaxed = merger.merge(&x, &y).unwrap();
    assert!(relaxed.is_clean(), "{:?}", relaxed.diagnostics);
    assert_eq!(relaxed.into_value().time.len(), 4);
}

#[test]
fn stamps_within_tolerance_are_shared() {
    let x = dataset("historical", vec![1.0, 2.0]);
    let y = dataset("rcp85", vec![2.0005, 3.0005]);
    let merger = ExperimentMerger::new(MergeConfig::default().with_time_tolerance(1e-3));
    assert!(matches!(
        merger.merge(&x, &y),
        Err(ClimopsError::TimeOverlap { shared: 1, .. })
    ));
    // with the default tolerance the series are merely far apart
    assert!(merge(&x, &y).is_ok());
}

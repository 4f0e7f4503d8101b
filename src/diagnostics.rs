//! Non-fatal diagnostics.
//!
//! An operation that completes but noticed something suspicious returns its
//! result wrapped in an [`Outcome`] together with the [`Diagnostic`]s it
//! raised. Failures are reported through [`crate::ClimopsError`] instead, so
//! "completed with diagnostics" and "failed" never look alike.

use std::fmt;

/// A condition worth reporting that does not invalidate the result.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The two merged datasets carry different ensemble labels.
    EnsembleMismatch {
        /// Labels of the earlier dataset.
        left: Vec<String>,
        /// Labels of the later dataset.
        right: Vec<String>,
    },
    /// The gap between two merged series does not match their time steps.
    ImplausibleGap {
        /// `min(right.time) - max(left.time)`.
        gap: f64,
        /// Internal time step of the earlier dataset, if it has one.
        left_step: Option<f64>,
        /// Internal time step of the later dataset, if it has one.
        right_step: Option<f64>,
    },
    /// A dataset has fewer than two time stamps, so its step is unknown.
    UnknownTimeStep {
        /// Experiment name of the dataset.
        experiment: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnsembleMismatch { left, right } => write!(
                f,
                "ensembles differ: [{}] vs [{}]",
                left.join(", "),
                right.join(", ")
            ),
            Self::ImplausibleGap {
                gap,
                left_step,
                right_step,
            } => write!(
                f,
                "time gap {} between experiments does not match time steps (left {}, right {})",
                gap,
                fmt_step(*left_step),
                fmt_step(*right_step)
            ),
            Self::UnknownTimeStep { experiment } => write!(
                f,
                "experiment '{}' has fewer than two time stamps; its time step is unknown",
                experiment
            ),
        }
    }
}

fn fmt_step(step: Option<f64>) -> String {
    step.map_or_else(|| "n/a".to_string(), |s| s.to_string())
}

/// A successful result plus the diagnostics raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    /// The result.
    pub value: T,
    /// Diagnostics in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Outcome<T> {
    /// Wrap a value with no diagnostics.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// True when no diagnostics were raised.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Discard the diagnostics.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Collects diagnostics and mirrors each one to `tracing::warn!`.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticSink {
    raised: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub(crate) fn raise(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.raised.push(diagnostic);
    }

    pub(crate) fn finish<T>(self, value: T) -> Outcome<T> {
        Outcome {
            value,
            diagnostics: self.raised,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_message_mentions_steps() {
        let d = Diagnostic::ImplausibleGap {
            gap: 2.0,
            left_step: Some(1.0),
            right_step: None,
        };
        assert_eq!(
            d.to_string(),
            "time gap 2 between experiments does not match time steps (left 1, right n/a)"
        );
    }

    #[test]
    fn clean_outcome_unwraps_to_value() {
        let outcome = Outcome::clean(42);
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_value(), 42);
    }

    #[test]
    fn sink_keeps_order() {
        let mut sink = DiagnosticSink::default();
        sink.raise(Diagnostic::UnknownTimeStep {
            experiment: "a".into(),
        });
        sink.raise(Diagnostic::EnsembleMismatch {
            left: vec!["r1i1p1".into()],
            right: vec!["r2i1p1".into()],
        });
        let outcome = sink.finish(());
        assert!(!outcome.is_clean());
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::UnknownTimeStep { .. }
        ));
    }
}

//! Tolerances and switches for the merge and regrid operations.

/// Configuration for [`crate::merge::ExperimentMerger`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Absolute tolerance used when comparing time stamps and time steps.
    pub time_tolerance: f64,
    /// Separator placed between the two experiment names.
    pub experiment_separator: String,
    /// Emit progress messages at info level instead of debug.
    pub verbose: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            time_tolerance: 1e-6,
            experiment_separator: ".".to_string(),
            verbose: false,
        }
    }
}

impl MergeConfig {
    /// Set the time tolerance.
    pub fn with_time_tolerance(mut self, tolerance: f64) -> Self {
        self.time_tolerance = tolerance;
        self
    }

    /// Set the experiment separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.experiment_separator = separator.into();
        self
    }

    /// Enable or disable progress messages.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Configuration for [`crate::regrid::Regridder`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegridConfig {
    /// Sphere radius used for cell areas (km by default, so areas are km²).
    pub earth_radius: f64,
    /// Maximum coordinate deviation tolerated when checking that a grid is
    /// rectilinear.
    pub coordinate_tolerance: f64,
    /// Emit progress messages at info level instead of debug.
    pub verbose: bool,
}

impl Default for RegridConfig {
    fn default() -> Self {
        Self {
            earth_radius: 6371.0,
            coordinate_tolerance: 1e-6,
            verbose: false,
        }
    }
}

impl RegridConfig {
    /// Set the sphere radius.
    pub fn with_earth_radius(mut self, radius: f64) -> Self {
        self.earth_radius = radius;
        self
    }

    /// Enable or disable progress messages.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Combined configuration for both operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Merge settings.
    pub merge: MergeConfig,
    /// Regrid settings.
    pub regrid: RegridConfig,
}

impl Config {
    /// Turn progress messages on or off for every operation.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.merge.verbose = verbose;
        self.regrid.verbose = verbose;
        self
    }
}

/// Log a progress message at info level when `verbose`, debug otherwise.
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

pub(crate) use progress;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.merge.experiment_separator, ".");
        assert!(!config.merge.verbose);
        assert_eq!(config.regrid.earth_radius, 6371.0);
    }

    #[test]
    fn verbose_applies_to_both() {
        let config = Config::default().with_verbose(true);
        assert!(config.merge.verbose);
        assert!(config.regrid.verbose);
    }
}

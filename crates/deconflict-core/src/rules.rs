//! Deconfliction rules and thresholds.

use serde::{Deserialize, Serialize};

use crate::error::{DeconflictError, Result};

/// Default spatial threshold in meters.
pub const DEFAULT_SPATIAL_THRESHOLD_M: f64 = 5.0;
/// Default temporal threshold in seconds.
pub const DEFAULT_TEMPORAL_THRESHOLD_S: f64 = 5.0;

/// How the stage 1 spatial scan visits sample pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// Every primary sample against every other sample.
    #[default]
    BruteForce,
    /// Only samples in neighboring lat/lon grid cells.
    Grid,
}

/// How the trajectory builder assigns samples and timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAxisPolicy {
    /// Fixed point count per waypoint segment, timestamps by flattened position.
    #[default]
    Segmented,
    /// One sample per timestamp, interpolated against its own time.
    Exact,
}

/// How the report lists primary locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Each section repeats every primary location seen so far.
    #[default]
    Cumulative,
    /// Each section lists only its own primary locations.
    PerTrajectory,
}

/// Configuration for a deconfliction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeconflictRules {
    /// Separation below which two samples are spatially conflicting (meters)
    pub spatial_threshold_m: f64,
    /// Time difference at or below which a spatial candidate is a conflict (seconds)
    pub temporal_threshold_s: f64,
    pub scan_strategy: ScanStrategy,
    pub time_axis: TimeAxisPolicy,
    pub report_mode: ReportMode,
}

impl Default for DeconflictRules {
    fn default() -> Self {
        Self {
            spatial_threshold_m: DEFAULT_SPATIAL_THRESHOLD_M,
            temporal_threshold_s: DEFAULT_TEMPORAL_THRESHOLD_S,
            scan_strategy: ScanStrategy::default(),
            time_axis: TimeAxisPolicy::default(),
            report_mode: ReportMode::default(),
        }
    }
}

impl DeconflictRules {
    pub fn with_thresholds(spatial_threshold_m: f64, temporal_threshold_s: f64) -> Self {
        Self {
            spatial_threshold_m,
            temporal_threshold_s,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_thresholds(self.spatial_threshold_m, self.temporal_threshold_s)
    }
}

/// Spatial threshold must be positive, temporal threshold non-negative.
pub fn validate_thresholds(spatial_threshold_m: f64, temporal_threshold_s: f64) -> Result<()> {
    if !spatial_threshold_m.is_finite() || spatial_threshold_m <= 0.0 {
        return Err(DeconflictError::Configuration(format!(
            "spatial threshold must be a positive number of meters, got {spatial_threshold_m}"
        )));
    }
    if !temporal_threshold_s.is_finite() || temporal_threshold_s < 0.0 {
        return Err(DeconflictError::Configuration(format!(
            "temporal threshold must be a non-negative number of seconds, got {}",
            temporal_threshold_s
        )));
    }
    Ok(())
}

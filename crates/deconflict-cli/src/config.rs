//! CLI configuration from environment.

use std::env;
use std::path::PathBuf;

use deconflict_core::rules::{DEFAULT_SPATIAL_THRESHOLD_M, DEFAULT_TEMPORAL_THRESHOLD_S};
use deconflict_core::{DeconflictRules, ReportMode, ScanStrategy, TimeAxisPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub spatial_threshold_m: f64,
    pub temporal_threshold_s: f64,
    pub data_dir: PathBuf,
    pub scan_strategy: ScanStrategy,
    pub report_mode: ReportMode,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            spatial_threshold_m: env::var("DECONFLICT_SPATIAL_THRESHOLD_M")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SPATIAL_THRESHOLD_M),
            temporal_threshold_s: env::var("DECONFLICT_TEMPORAL_THRESHOLD_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TEMPORAL_THRESHOLD_S),
            data_dir: env::var("DECONFLICT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            scan_strategy: env::var("DECONFLICT_SCAN")
                .ok()
                .and_then(|s| parse_scan_strategy(&s))
                .unwrap_or_default(),
            report_mode: env::var("DECONFLICT_REPORT")
                .ok()
                .and_then(|s| parse_report_mode(&s))
                .unwrap_or_default(),
        }
    }

    /// Rules for a run, with the given time axis policy.
    pub fn rules(&self, time_axis: TimeAxisPolicy) -> DeconflictRules {
        DeconflictRules {
            spatial_threshold_m: self.spatial_threshold_m,
            temporal_threshold_s: self.temporal_threshold_s,
            scan_strategy: self.scan_strategy,
            time_axis,
            report_mode: self.report_mode,
        }
    }
}

pub fn parse_scan_strategy(value: &str) -> Option<ScanStrategy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "brute" | "brute_force" | "brute-force" => Some(ScanStrategy::BruteForce),
        "grid" => Some(ScanStrategy::Grid),
        _ => None,
    }
}

pub fn parse_report_mode(value: &str) -> Option<ReportMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cumulative" => Some(ReportMode::Cumulative),
        "per-trajectory" | "per_trajectory" => Some(ReportMode::PerTrajectory),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_strategy() {
        assert_eq!(parse_scan_strategy("Grid"), Some(ScanStrategy::Grid));
        assert_eq!(parse_scan_strategy(" brute "), Some(ScanStrategy::BruteForce));
        assert_eq!(parse_scan_strategy("kdtree"), None);
    }

    #[test]
    fn test_parse_report_mode() {
        assert_eq!(parse_report_mode("per-trajectory"), Some(ReportMode::PerTrajectory));
        assert_eq!(parse_report_mode("CUMULATIVE"), Some(ReportMode::Cumulative));
        assert_eq!(parse_report_mode("verbose"), None);
    }
}

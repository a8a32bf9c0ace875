//! Conflict detection module.
//!
//! Compares a primary trajectory against every simulated trajectory in two
//! stages: a spatial scan that collects sample pairs closer than the spatial
//! threshold, then a temporal filter that keeps only the candidates whose
//! timestamps are within the temporal threshold.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Conflict, Trajectory};
use crate::rules::{
    validate_thresholds, DeconflictRules, ScanStrategy, DEFAULT_SPATIAL_THRESHOLD_M,
    DEFAULT_TEMPORAL_THRESHOLD_S,
};
use crate::spatial::{distance3d, meters_per_deg_lon};

/// Lower bound on meters per degree of latitude anywhere on the ellipsoid.
const MIN_METERS_PER_DEG_LAT: f64 = 110_000.0;
/// Slack applied to the longitude scale so grid cells never undersize.
const GRID_MARGIN: f64 = 1.1;
/// Thresholds a sample must stay clear of either pole for longitude cells
/// to bound the search.
const POLE_CLEARANCE: f64 = 10.0;
/// Largest cell index magnitude, leaving room for neighbor offsets.
const MAX_CELL_INDEX: f64 = 4_503_599_627_370_496.0;

/// Spatial-only and spatial+temporal results of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub spatial: Vec<Conflict>,
    pub temporal: Vec<Conflict>,
}

impl Analysis {
    pub fn has_conflict(&self) -> bool {
        !self.temporal.is_empty()
    }
}

/// Offline two-stage conflict detector.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    /// Separation below which samples conflict (meters)
    pub spatial_threshold_m: f64,
    /// Time difference at or below which candidates conflict (seconds)
    pub temporal_threshold_s: f64,
    pub scan_strategy: ScanStrategy,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self {
            spatial_threshold_m: DEFAULT_SPATIAL_THRESHOLD_M,
            temporal_threshold_s: DEFAULT_TEMPORAL_THRESHOLD_S,
            scan_strategy: ScanStrategy::BruteForce,
        }
    }
}

impl ConflictDetector {
    /// Create a detector, rejecting out-of-range thresholds.
    pub fn new(spatial_threshold_m: f64, temporal_threshold_s: f64) -> Result<Self> {
        validate_thresholds(spatial_threshold_m, temporal_threshold_s)?;
        Ok(Self {
            spatial_threshold_m,
            temporal_threshold_s,
            scan_strategy: ScanStrategy::BruteForce,
        })
    }

    pub fn from_rules(rules: &DeconflictRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self {
            spatial_threshold_m: rules.spatial_threshold_m,
            temporal_threshold_s: rules.temporal_threshold_s,
            scan_strategy: rules.scan_strategy,
        })
    }

    pub fn with_scan_strategy(mut self, scan_strategy: ScanStrategy) -> Self {
        self.scan_strategy = scan_strategy;
        self
    }

    /// Run both stages and return the spatial+temporal conflicts.
    pub fn detect(
        &self,
        primary: &Trajectory,
        others: &[(String, Trajectory)],
    ) -> Result<Vec<Conflict>> {
        Ok(self.analyze(primary, others)?.temporal)
    }

    /// Run both stages and return both result sets.
    pub fn analyze(
        &self,
        primary: &Trajectory,
        others: &[(String, Trajectory)],
    ) -> Result<Analysis> {
        let candidates = self.scan_all(primary, others)?;

        let temporal: Vec<Conflict> = candidates
            .iter()
            .filter_map(|(idx, candidate)| {
                self.temporal_filter(primary, &others[*idx].1, candidate)
            })
            .collect();

        tracing::info!(
            others = others.len(),
            spatial = candidates.len(),
            temporal = temporal.len(),
            "deconfliction analysis complete"
        );

        Ok(Analysis {
            spatial: candidates.into_iter().map(|(_, conflict)| conflict).collect(),
            temporal,
        })
    }

    /// Stage 1: spatial candidates for every other trajectory, in input order.
    ///
    /// Trajectories without any candidate pair are omitted.
    pub fn spatial_scan(
        &self,
        primary: &Trajectory,
        others: &[(String, Trajectory)],
    ) -> Result<Vec<Conflict>> {
        Ok(self
            .scan_all(primary, others)?
            .into_iter()
            .map(|(_, conflict)| conflict)
            .collect())
    }

    /// Stage 2: keep the candidate pairs whose timestamps are within the
    /// temporal threshold (inclusive). Returns `None` if no pair survives.
    ///
    /// `candidates` must come from [`Self::spatial_scan`] over the same two
    /// trajectories; pairs indexing past either trajectory are dropped.
    pub fn temporal_filter(
        &self,
        primary: &Trajectory,
        other: &Trajectory,
        candidates: &Conflict,
    ) -> Option<Conflict> {
        let mut kept = Conflict::new(candidates.other_id.clone());
        for (i, j) in candidates.pairs() {
            let (Some(p), Some(o)) = (primary.get(i), other.get(j)) else {
                continue;
            };
            let time_diff = p.timestamp.abs_diff(o.timestamp) as f64;
            if time_diff <= self.temporal_threshold_s {
                kept.push(i, j);
            }
        }
        (!kept.is_empty()).then_some(kept)
    }

    /// Validate inputs and scan every other trajectory, keeping its position
    /// in `others` alongside the candidates.
    fn scan_all(
        &self,
        primary: &Trajectory,
        others: &[(String, Trajectory)],
    ) -> Result<Vec<(usize, Conflict)>> {
        validate_thresholds(self.spatial_threshold_m, self.temporal_threshold_s)?;
        primary.validate()?;
        for (_, other) in others {
            other.validate()?;
        }

        let mut results = Vec::new();
        for (idx, (id, other)) in others.iter().enumerate() {
            let candidates = match self.scan_strategy {
                ScanStrategy::BruteForce => self.scan_brute_force(primary, other, id),
                ScanStrategy::Grid => self.scan_grid(primary, other, id),
            };
            tracing::debug!(
                other_id = %id,
                candidates = candidates.len(),
                "spatial scan"
            );
            if !candidates.is_empty() {
                results.push((idx, candidates));
            }
        }
        Ok(results)
    }

    fn scan_brute_force(&self, primary: &Trajectory, other: &Trajectory, id: &str) -> Conflict {
        let mut conflict = Conflict::new(id);
        for (i, p) in primary.samples().iter().enumerate() {
            for (j, o) in other.samples().iter().enumerate() {
                if distance3d(p.position(), o.position()) < self.spatial_threshold_m {
                    conflict.push(i, j);
                }
            }
        }
        conflict
    }

    /// Same candidates, same order as the brute-force scan, visiting only
    /// other samples in the 3x3 block of grid cells around each primary sample.
    fn scan_grid(&self, primary: &Trajectory, other: &Trajectory, id: &str) -> Conflict {
        let Some(grid) = SampleGrid::build(primary, other, self.spatial_threshold_m) else {
            tracing::debug!(other_id = %id, "grid unavailable, scanning all pairs");
            return self.scan_brute_force(primary, other, id);
        };

        let mut conflict = Conflict::new(id);
        let mut nearby: Vec<usize> = Vec::new();
        for (i, p) in primary.samples().iter().enumerate() {
            let (cell_lat, cell_lon) = grid.cell(p.lat, p.lon);

            nearby.clear();
            for dlat in -1..=1_i64 {
                for dlon in -1..=1_i64 {
                    let (Some(lat), Some(lon)) =
                        (cell_lat.checked_add(dlat), cell_lon.checked_add(dlon))
                    else {
                        continue;
                    };
                    if let Some(indices) = grid.cells.get(&(lat, lon)) {
                        nearby.extend_from_slice(indices);
                    }
                }
            }
            nearby.sort_unstable();

            for &j in &nearby {
                let o = &other.samples()[j];
                if distance3d(p.position(), o.position()) < self.spatial_threshold_m {
                    conflict.push(i, j);
                }
            }
        }
        conflict
    }
}

/// Convenience wrapper for a brute-force detector with the given thresholds.
pub fn detect(
    primary: &Trajectory,
    others: &[(String, Trajectory)],
    spatial_threshold_m: f64,
    temporal_threshold_s: f64,
) -> Result<Vec<Conflict>> {
    ConflictDetector::new(spatial_threshold_m, temporal_threshold_s)?.detect(primary, others)
}

/// Lat/lon buckets over the samples of one trajectory.
///
/// Cells are at least one spatial threshold wide in both directions, so any
/// pair closer than the threshold lies in the same or an adjacent cell.
/// Building fails (and the caller scans every pair) when that cannot hold:
/// paths spanning the antimeridian, samples within a few thresholds of a
/// pole, or cells too small to index.
struct SampleGrid {
    lat_cell_deg: f64,
    lon_cell_deg: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SampleGrid {
    fn build(primary: &Trajectory, other: &Trajectory, threshold_m: f64) -> Option<Self> {
        let all = primary.samples().iter().chain(other.samples());
        let (mut min_lon, mut max_lon, mut max_abs_lat) = (f64::MAX, f64::MIN, 0.0_f64);
        let mut max_abs_lon = 0.0_f64;
        for sample in all {
            min_lon = min_lon.min(sample.lon);
            max_lon = max_lon.max(sample.lon);
            max_abs_lat = max_abs_lat.max(sample.lat.abs());
            max_abs_lon = max_abs_lon.max(sample.lon.abs());
        }

        // Longitude cells do not wrap at the antimeridian.
        if other.is_empty() || max_lon - min_lon > 180.0 {
            return None;
        }

        // Near a pole, nearby samples can differ by any amount of longitude.
        let pole_gap_m = (90.0 - max_abs_lat) * MIN_METERS_PER_DEG_LAT;
        if pole_gap_m <= POLE_CLEARANCE * threshold_m {
            return None;
        }

        let lat_scale = MIN_METERS_PER_DEG_LAT;
        let lon_scale = (meters_per_deg_lon(max_abs_lat) / GRID_MARGIN).max(1.0);
        let lat_cell_deg = threshold_m / lat_scale;
        let lon_cell_deg = threshold_m / lon_scale;

        let extent = (max_abs_lat / lat_cell_deg).max(max_abs_lon / lon_cell_deg);
        if 3.0 * lon_cell_deg >= 360.0
            || lat_cell_deg.min(lon_cell_deg) <= 0.0
            || extent >= MAX_CELL_INDEX
        {
            return None;
        }

        let mut grid = Self {
            lat_cell_deg,
            lon_cell_deg,
            cells: HashMap::new(),
        };
        for (j, sample) in other.samples().iter().enumerate() {
            let key = grid.cell(sample.lat, sample.lon);
            grid.cells.entry(key).or_default().push(j);
        }
        Some(grid)
    }

    fn cell(&self, lat: f64, lon: f64) -> (i64, i64) {
        (
            (lat / self.lat_cell_deg).floor() as i64,
            (lon / self.lon_cell_deg).floor() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeconflictError;
    use crate::models::MissionWindow;

    fn single(lat: f64, lon: f64, alt: f64, t: i64) -> Trajectory {
        Trajectory::from_columns(&[lat], &[lon], &[alt], &[t], MissionWindow::new(0, 20).unwrap())
            .unwrap()
    }

    fn others(trajectories: Vec<Trajectory>) -> Vec<(String, Trajectory)> {
        trajectories
            .into_iter()
            .enumerate()
            .map(|(i, t)| (i.to_string(), t))
            .collect()
    }

    #[test]
    fn test_close_in_space_and_time_conflicts() {
        let primary = single(0.0, 0.0, 100.0, 10);
        let sims = others(vec![single(0.0, 0.00003, 100.0, 12)]);

        let conflicts = detect(&primary, &sims, 5.0, 5.0).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].other_id, "0");
        assert_eq!(conflicts[0].pairs().collect::<Vec<_>>(), vec![(0, 0)]);
    }

    #[test]
    fn test_close_in_space_but_not_time() {
        let primary = single(0.0, 0.0, 100.0, 10);
        let sims = others(vec![single(0.0, 0.00003, 100.0, 12)]);

        let detector = ConflictDetector::new(5.0, 1.0).unwrap();
        let analysis = detector.analyze(&primary, &sims).unwrap();
        assert_eq!(analysis.spatial.len(), 1);
        assert!(analysis.temporal.is_empty());
        assert!(!analysis.has_conflict());
    }

    #[test]
    fn test_spatial_threshold_is_strict() {
        let primary = single(0.0, 0.0, 100.0, 10);
        let other = single(0.0, 0.00003, 103.0, 10);
        let exact = distance3d(primary.samples()[0].position(), other.samples()[0].position());
        let sims = others(vec![other]);

        assert!(detect(&primary, &sims, exact, 5.0).unwrap().is_empty());
        assert_eq!(detect(&primary, &sims, exact + 1e-6, 5.0).unwrap().len(), 1);
    }

    #[test]
    fn test_temporal_threshold_is_inclusive() {
        let primary = single(0.0, 0.0, 100.0, 10);
        let sims = others(vec![single(0.0, 0.0, 100.0, 13)]);

        assert_eq!(detect(&primary, &sims, 5.0, 3.0).unwrap().len(), 1);
        assert!(detect(&primary, &sims, 5.0, 2.999).unwrap().is_empty());
    }

    #[test]
    fn test_empty_others_yield_nothing() {
        let primary = single(0.0, 0.0, 100.0, 10);
        assert!(detect(&primary, &[], 5.0, 5.0).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        assert!(matches!(
            ConflictDetector::new(0.0, 5.0),
            Err(DeconflictError::Configuration(_))
        ));
        assert!(matches!(
            ConflictDetector::new(5.0, -1.0),
            Err(DeconflictError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_trajectory() {
        let primary = single(0.0, 0.0, 100.0, 10);
        let mut raw = serde_json::to_value(single(0.0, 0.0, 100.0, 10)).unwrap();
        raw["samples"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"lat": 0.0, "lon": 0.0, "altitude_m": 100.0, "timestamp": 2}));
        let malformed: Trajectory = serde_json::from_value(raw).unwrap();

        let err = detect(&primary, &others(vec![malformed]), 5.0, 5.0).unwrap_err();
        assert!(matches!(err, DeconflictError::InvalidTrajectory(_)));
    }

    #[test]
    fn test_grid_with_tiny_threshold_matches_brute_force() {
        let primary = single(33.0, -117.0, 100.0, 10);
        let sims = others(vec![single(33.0, -117.0, 100.0, 10)]);

        let brute = ConflictDetector::new(1e-300, 5.0).unwrap();
        let grid = brute.clone().with_scan_strategy(ScanStrategy::Grid);
        let expected = brute.analyze(&primary, &sims).unwrap();
        assert_eq!(expected.temporal.len(), 1);
        assert_eq!(grid.analyze(&primary, &sims).unwrap(), expected);
    }

    #[test]
    fn test_grid_refuses_unindexable_cells() {
        let primary = single(33.0, -117.0, 100.0, 10);
        let other = single(33.0, -117.0, 100.0, 10);
        assert!(SampleGrid::build(&primary, &other, 1e-300).is_none());
        assert!(SampleGrid::build(&primary, &other, 5.0).is_some());

        let polar = single(89.99999, 90.0, 100.0, 10);
        assert!(SampleGrid::build(&single(89.99999, 0.0, 100.0, 10), &polar, 5.0).is_none());
    }

    #[test]
    fn test_temporal_filter_drops_out_of_range_pairs() {
        let primary = single(0.0, 0.0, 100.0, 10);
        let other = single(0.0, 0.0, 100.0, 10);
        let mut candidates = Conflict::new("0");
        candidates.push(0, 0);
        candidates.push(3, 0);
        candidates.push(0, 7);

        let kept = ConflictDetector::default()
            .temporal_filter(&primary, &other, &candidates)
            .unwrap();
        assert_eq!(kept.pairs().collect::<Vec<_>>(), vec![(0, 0)]);
    }

    #[test]
    fn test_trajectories_without_candidates_are_dropped() {
        let primary = single(0.0, 0.0, 100.0, 10);
        let sims = others(vec![
            single(1.0, 1.0, 100.0, 10),
            single(0.0, 0.0, 101.0, 10),
        ]);

        let conflicts = detect(&primary, &sims, 5.0, 5.0).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].other_id, "1");
    }
}

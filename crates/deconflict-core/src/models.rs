//! Core data models for the deconfliction system.

use serde::{Deserialize, Serialize};

use crate::error::{DeconflictError, Result};

/// A sparse recorded control point of a flight path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64, altitude_m: f64) -> Self {
        Self {
            lat,
            lon,
            altitude_m,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.altitude_m.is_finite()
    }
}

/// Time interval over which a set of waypoints is flown, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionWindow {
    pub start_time: i64,
    pub end_time: i64,
}

impl MissionWindow {
    /// Create a mission window, rejecting empty or inverted intervals.
    pub fn new(start_time: i64, end_time: i64) -> Result<Self> {
        if end_time <= start_time {
            return Err(DeconflictError::InvalidInput(format!(
                "end time {end_time} must be after start time {start_time}"
            )));
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    pub fn duration(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// One densified point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    pub timestamp: i64,
}

impl Sample {
    /// (lat, lon, altitude_m) triple used by the distance functions.
    pub fn position(&self) -> (f64, f64, f64) {
        (self.lat, self.lon, self.altitude_m)
    }
}

/// Densely time-sampled flight path.
///
/// Built by [`crate::trajectory::build`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<Sample>,
    window: MissionWindow,
}

impl Trajectory {
    pub(crate) fn from_samples(samples: Vec<Sample>, window: MissionWindow) -> Self {
        Self { samples, window }
    }

    /// Assemble a trajectory from parallel column arrays.
    ///
    /// This is the entry point for externally produced trajectories, so the
    /// columns are checked for equal length, finite coordinates and
    /// non-decreasing timestamps.
    pub fn from_columns(
        lats: &[f64],
        lons: &[f64],
        altitudes_m: &[f64],
        timestamps: &[i64],
        window: MissionWindow,
    ) -> Result<Self> {
        let len = lats.len();
        if lons.len() != len || altitudes_m.len() != len || timestamps.len() != len {
            return Err(DeconflictError::InvalidTrajectory(format!(
                "column lengths differ: lat={}, lon={}, alt={}, timestamp={}",
                len,
                lons.len(),
                altitudes_m.len(),
                timestamps.len()
            )));
        }

        let samples = (0..len)
            .map(|i| Sample {
                lat: lats[i],
                lon: lons[i],
                altitude_m: altitudes_m[i],
                timestamp: timestamps[i],
            })
            .collect();

        let trajectory = Self { samples, window };
        trajectory.validate()?;
        Ok(trajectory)
    }

    /// Check the structural invariants the detector relies on.
    pub fn validate(&self) -> Result<()> {
        if self.window.end_time <= self.window.start_time {
            return Err(DeconflictError::InvalidTrajectory(format!(
                "mission window [{}, {}] is empty",
                self.window.start_time, self.window.end_time
            )));
        }

        for (idx, sample) in self.samples.iter().enumerate() {
            if !(sample.lat.is_finite()
                && sample.lon.is_finite()
                && sample.altitude_m.is_finite())
            {
                return Err(DeconflictError::InvalidTrajectory(format!(
                    "sample {idx} has a non-finite coordinate"
                )));
            }
        }

        if let Some(idx) = self
            .samples
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(DeconflictError::InvalidTrajectory(format!(
                "timestamps decrease between samples {} and {}",
                idx,
                idx + 1
            )));
        }

        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> MissionWindow {
        self.window
    }

    pub fn start_time(&self) -> i64 {
        self.window.start_time
    }

    pub fn end_time(&self) -> i64 {
        self.window.end_time
    }

    pub fn duration(&self) -> i64 {
        self.window.duration()
    }
}

/// Index pairs between the primary trajectory and one other trajectory.
///
/// `primary_indices[k]` and `other_indices[k]` form the k-th pair, in the
/// order the spatial scan discovered them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub other_id: String,
    pub primary_indices: Vec<usize>,
    pub other_indices: Vec<usize>,
}

impl Conflict {
    pub fn new(other_id: impl Into<String>) -> Self {
        Self {
            other_id: other_id.into(),
            primary_indices: Vec::new(),
            other_indices: Vec::new(),
        }
    }

    pub fn push(&mut self, primary_index: usize, other_index: usize) {
        self.primary_indices.push(primary_index);
        self.other_indices.push(other_index);
    }

    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.primary_indices
            .iter()
            .copied()
            .zip(self.other_indices.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.primary_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary_indices.is_empty()
    }
}

//! Trajectory densification.
//!
//! Turns an ordered list of sparse waypoints plus a mission window into a
//! dense, time-indexed [`Trajectory`]. Waypoints carry no timestamps of their
//! own; they are assumed to be flown at a constant logical pace across the
//! window.

use crate::error::{DeconflictError, Result};
use crate::models::{MissionWindow, Sample, Trajectory, Waypoint};
use crate::rules::TimeAxisPolicy;

/// Minimum number of samples generated for any waypoint segment.
const MIN_SEGMENT_POINTS: usize = 2;

/// Build a trajectory with the default segmented allocation.
pub fn build(waypoints: &[Waypoint], start_time: i64, end_time: i64) -> Result<Trajectory> {
    let window = MissionWindow::new(start_time, end_time)?;
    build_with_policy(waypoints, window, TimeAxisPolicy::Segmented)
}

/// Build a trajectory using the given time axis policy.
pub fn build_with_policy(
    waypoints: &[Waypoint],
    window: MissionWindow,
    policy: TimeAxisPolicy,
) -> Result<Trajectory> {
    validate_input(waypoints, window)?;

    let samples = match policy {
        TimeAxisPolicy::Segmented => segmented_samples(waypoints, window),
        TimeAxisPolicy::Exact => exact_samples(waypoints, window),
    };

    tracing::debug!(
        waypoints = waypoints.len(),
        samples = samples.len(),
        duration_s = window.duration(),
        ?policy,
        "built trajectory"
    );

    Ok(Trajectory::from_samples(samples, window))
}

fn validate_input(waypoints: &[Waypoint], window: MissionWindow) -> Result<()> {
    if waypoints.len() < 2 {
        return Err(DeconflictError::InvalidInput(format!(
            "at least 2 waypoints are required, got {}",
            waypoints.len()
        )));
    }
    if window.end_time <= window.start_time {
        return Err(DeconflictError::InvalidInput(format!(
            "end time {} must be after start time {}",
            window.end_time, window.start_time
        )));
    }
    if let Some(idx) = waypoints.iter().position(|wp| !wp.is_finite()) {
        return Err(DeconflictError::InvalidInput(format!(
            "waypoint {idx} has a non-finite coordinate"
        )));
    }
    Ok(())
}

/// Fixed point count per segment; timestamps taken from one global axis by
/// position in the flattened output.
///
/// Each segment regenerates its start point, so interior waypoints appear
/// twice. When the per-segment floor pushes the output past the end of the
/// time axis, the surplus samples are stamped with the window's end time.
fn segmented_samples(waypoints: &[Waypoint], window: MissionWindow) -> Vec<Sample> {
    let total_points = window.duration() as usize;
    let num_segments = waypoints.len() - 1;
    let segment_points = (total_points / num_segments).max(MIN_SEGMENT_POINTS);
    let times = time_axis(window.start_time, window.end_time, total_points);

    let mut samples = Vec::with_capacity(segment_points * num_segments);
    for pair in waypoints.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        for j in 0..segment_points {
            let timestamp = times
                .get(samples.len())
                .copied()
                .unwrap_or(window.end_time);
            samples.push(Sample {
                lat: linspace_at(from.lat, to.lat, segment_points, j),
                lon: linspace_at(from.lon, to.lon, segment_points, j),
                altitude_m: linspace_at(from.altitude_m, to.altitude_m, segment_points, j),
                timestamp,
            });
        }
    }
    samples
}

/// One sample per whole second, positioned by interpolating against the
/// sample's own timestamp.
fn exact_samples(waypoints: &[Waypoint], window: MissionWindow) -> Vec<Sample> {
    let num_segments = waypoints.len() - 1;
    let duration = window.duration() as f64;

    (window.start_time..=window.end_time)
        .map(|timestamp| {
            let progress = (timestamp - window.start_time) as f64 / duration * num_segments as f64;
            let segment = (progress.floor() as usize).min(num_segments - 1);
            let ratio = (progress - segment as f64).clamp(0.0, 1.0);
            let (from, to) = (waypoints[segment], waypoints[segment + 1]);
            Sample {
                lat: lerp(from.lat, to.lat, ratio),
                lon: lerp(from.lon, to.lon, ratio),
                altitude_m: lerp(from.altitude_m, to.altitude_m, ratio),
                timestamp,
            }
        })
        .collect()
}

/// `count` evenly spaced integer timestamps over `[start, end]`, truncated
/// toward zero. The last entry is exactly `end` when `count > 1`.
fn time_axis(start: i64, end: i64, count: usize) -> Vec<i64> {
    (0..count)
        .map(|k| linspace_at(start as f64, end as f64, count, k).trunc() as i64)
        .collect()
}

/// Value at position `k` of `count` evenly spaced values from `start` to `stop` inclusive.
fn linspace_at(start: f64, stop: f64, count: usize, k: usize) -> f64 {
    if count <= 1 {
        return start;
    }
    if k + 1 == count {
        return stop;
    }
    start + (stop - start) * (k as f64 / (count - 1) as f64)
}

fn lerp(from: f64, to: f64, ratio: f64) -> f64 {
    from + (to - from) * ratio
}

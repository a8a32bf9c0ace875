//! Waypoint and mission file loading.
//!
//! A flight path is a CSV of `lat,long,alt` rows plus a JSON mission record
//! `{"T_start": .., "T_end": ..}`. Simulated paths live in a data directory as
//! `sim_drone_<id>.csv` / `sim_drone_<id>.json` pairs.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use deconflict_core::{MissionWindow, Waypoint};

pub const SIM_PREFIX: &str = "sim_drone_";

/// Raw flight path as read from disk, before densification.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPathSource {
    pub waypoints: Vec<Waypoint>,
    pub window: MissionWindow,
}

#[derive(Deserialize)]
struct Record {
    lat: f64,
    long: f64,
    alt: f64,
}

#[derive(Deserialize)]
struct MissionRecord {
    #[serde(rename = "T_start")]
    start: f64,
    #[serde(rename = "T_end")]
    end: f64,
}

pub fn load_waypoints<R: std::io::Read>(reader: R) -> Result<Vec<Waypoint>> {
    let mut waypoints = Vec::new();
    for (row, rec) in csv::Reader::from_reader(reader).deserialize().enumerate() {
        let rec: Record = rec.with_context(|| format!("bad waypoint row {}", row + 1))?;
        waypoints.push(Waypoint::new(rec.lat, rec.long, rec.alt));
    }
    Ok(waypoints)
}

pub fn load_mission<R: std::io::Read>(reader: R) -> Result<MissionWindow> {
    let rec: MissionRecord = serde_json::from_reader(reader).context("bad mission record")?;
    let start = whole_seconds(rec.start, "T_start")?;
    let end = whole_seconds(rec.end, "T_end")?;
    Ok(MissionWindow::new(start, end)?)
}

fn whole_seconds(value: f64, field: &str) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        bail!("{field} must be a whole number of seconds, got {value}");
    }
    Ok(value as i64)
}

/// Load one flight path from its CSV and JSON files.
pub fn load_flight_path(csv_path: &Path, json_path: &Path) -> Result<FlightPathSource> {
    let csv_file = fs::File::open(csv_path)
        .with_context(|| format!("opening {}", csv_path.display()))?;
    let waypoints =
        load_waypoints(csv_file).with_context(|| format!("reading {}", csv_path.display()))?;

    let json_file = fs::File::open(json_path)
        .with_context(|| format!("opening {}", json_path.display()))?;
    let window =
        load_mission(json_file).with_context(|| format!("reading {}", json_path.display()))?;

    Ok(FlightPathSource { waypoints, window })
}

/// Find every `sim_drone_<id>.csv` in `dir` with its matching JSON file,
/// sorted by file name. A CSV without a JSON partner is an error.
pub fn discover_sim_paths(dir: &Path) -> Result<Vec<(String, PathBuf, PathBuf)>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading data directory {}", dir.display()))?;

    let mut csv_paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_sim_csv = path.extension().is_some_and(|ext| ext == "csv")
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(SIM_PREFIX));
        if is_sim_csv {
            csv_paths.push(path);
        }
    }
    csv_paths.sort();

    let mut found = Vec::with_capacity(csv_paths.len());
    for csv_path in csv_paths {
        let json_path = csv_path.with_extension("json");
        if !json_path.is_file() {
            bail!("File not found: {}", json_path.display());
        }
        let id = csv_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_prefix(SIM_PREFIX))
            .unwrap_or_default()
            .to_string();
        found.push((id, csv_path, json_path));
    }
    Ok(found)
}

/// Load every simulated flight path in `dir`.
pub fn load_sim_paths(dir: &Path) -> Result<Vec<(String, FlightPathSource)>> {
    discover_sim_paths(dir)?
        .into_iter()
        .map(|(id, csv_path, json_path)| Ok((id, load_flight_path(&csv_path, &json_path)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_waypoints_by_header() {
        let data = "alt,lat,long,label\n50,33.1,-117.2,a\n60.5,33.2,-117.3,b\n";
        let waypoints = load_waypoints(data.as_bytes()).unwrap();
        assert_eq!(
            waypoints,
            vec![
                Waypoint::new(33.1, -117.2, 50.0),
                Waypoint::new(33.2, -117.3, 60.5)
            ]
        );
    }

    #[test]
    fn test_load_waypoints_missing_column() {
        let data = "lat,long\n33.1,-117.2\n";
        assert!(load_waypoints(data.as_bytes()).is_err());
    }

    #[test]
    fn test_load_mission() {
        let window = load_mission(r#"{"T_start": 0, "T_end": 120.0}"#.as_bytes()).unwrap();
        assert_eq!(window, MissionWindow::new(0, 120).unwrap());
    }

    #[test]
    fn test_load_mission_rejects_fractional_and_inverted() {
        assert!(load_mission(r#"{"T_start": 0.5, "T_end": 10}"#.as_bytes()).is_err());
        assert!(load_mission(r#"{"T_start": 10, "T_end": 10}"#.as_bytes()).is_err());
        assert!(load_mission(r#"{"T_start": 10}"#.as_bytes()).is_err());
    }
}

//! Pre-defined deconfliction scenarios for demos and testing.

use deconflict_core::spatial::offset_by_bearing;
use deconflict_core::{MissionWindow, Waypoint};

use crate::loader::FlightPathSource;

const OFFSET_M: f64 = 300.0;
const ALTITUDE_M: f64 = 50.0;
const MISSION_START: i64 = 0;
const MISSION_END: i64 = 60;

/// A named primary flight plus the simulated flights sharing its airspace.
pub struct Scenario {
    pub name: String,
    pub primary: FlightPathSource,
    pub sims: Vec<(String, FlightPathSource)>,
}

/// Look up a scenario by name.
pub fn by_name(name: &str, center_lat: f64, center_lon: f64) -> Option<Scenario> {
    match name {
        "crossing" => Some(create_crossing_scenario(center_lat, center_lon)),
        "parallel" => Some(create_parallel_scenario(center_lat, center_lon)),
        "converging" => Some(create_converging_scenario(center_lat, center_lon)),
        _ => None,
    }
}

fn window() -> MissionWindow {
    MissionWindow {
        start_time: MISSION_START,
        end_time: MISSION_END,
    }
}

/// Path through (`lat`, `lon`) from `from_deg` to `to_deg` bearings, via the point itself.
fn through(lat: f64, lon: f64, from_deg: f64, to_deg: f64) -> FlightPathSource {
    let (start_lat, start_lon) = offset_by_bearing(lat, lon, OFFSET_M, from_deg.to_radians());
    let (end_lat, end_lon) = offset_by_bearing(lat, lon, OFFSET_M, to_deg.to_radians());
    FlightPathSource {
        waypoints: vec![
            Waypoint::new(start_lat, start_lon, ALTITUDE_M),
            Waypoint::new(lat, lon, ALTITUDE_M),
            Waypoint::new(end_lat, end_lon, ALTITUDE_M),
        ],
        window: window(),
    }
}

/// Primary flies West to East, one sim flies South to North, crossing at
/// the center at the same time.
pub fn create_crossing_scenario(center_lat: f64, center_lon: f64) -> Scenario {
    Scenario {
        name: "crossing".to_string(),
        primary: through(center_lat, center_lon, 270.0, 90.0),
        sims: vec![("1".to_string(), through(center_lat, center_lon, 180.0, 0.0))],
    }
}

/// Primary and one sim fly parallel West to East tracks 100m apart (no conflict).
pub fn create_parallel_scenario(center_lat: f64, center_lon: f64) -> Scenario {
    let separation_m = 100.0;
    let (sep_lat, sep_lon) =
        offset_by_bearing(center_lat, center_lon, separation_m, 0.0_f64.to_radians());

    Scenario {
        name: "parallel".to_string(),
        primary: through(center_lat, center_lon, 270.0, 90.0),
        sims: vec![("1".to_string(), through(sep_lat, sep_lon, 270.0, 90.0))],
    }
}

/// Four sims converge on the center from the cardinal directions and pass
/// through it at the same time as the primary.
pub fn create_converging_scenario(center_lat: f64, center_lon: f64) -> Scenario {
    let angles: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

    let sims = angles
        .iter()
        .enumerate()
        .map(|(i, &angle)| {
            let path = through(center_lat, center_lon, angle, (angle + 180.0) % 360.0);
            ((i + 1).to_string(), path)
        })
        .collect();

    Scenario {
        name: "converging".to_string(),
        primary: through(center_lat, center_lon, 225.0, 45.0),
        sims,
    }
}

//! Spatial math for conflict detection and distance calculations.

use geo::{Distance, Geodesic, Point};

use crate::models::Waypoint;

/// Mean earth radius, used for bearing offsets.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geodesic distance between two lat/lon points on the WGS84 ellipsoid, in meters.
pub fn geodesic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Geodesic::distance(Point::new(lon1, lat1), Point::new(lon2, lat2))
}

/// 3D separation between two (lat, lon, altitude_m) positions, in meters.
///
/// The horizontal component is the ellipsoidal geodesic arc and the vertical
/// component is the altitude delta; the two are combined as a Euclidean norm,
/// which treats the airspace as locally flat.
pub fn distance3d(p1: (f64, f64, f64), p2: (f64, f64, f64)) -> f64 {
    let horizontal = geodesic_distance(p1.0, p1.1, p2.0, p2.1);
    let vertical = (p1.2 - p2.2).abs();
    (horizontal.powi(2) + vertical.powi(2)).sqrt()
}

/// Total horizontal length of a waypoint path in meters.
pub fn total_path_length_m(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| geodesic_distance(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
        .sum()
}

// ==== Local scaling ====

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geodesic_known_distance() {
        // One degree of latitude at the equator on WGS84 is ~110.57km.
        let dist = geodesic_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 110_574.0).abs() < 10.0, "got {dist}");
    }

    #[test]
    fn test_distance3d_same_point_is_zero() {
        let p = (33.6846, -117.8265, 50.0);
        assert!(distance3d(p, p) < 1e-9);
    }

    #[test]
    fn test_distance3d_is_symmetric() {
        let a = (33.6846, -117.8265, 50.0);
        let b = (33.6850, -117.8270, 72.5);
        assert_eq!(distance3d(a, b), distance3d(b, a));
    }

    #[test]
    fn test_distance3d_vertical_only() {
        let dist = distance3d((10.0, 20.0, 100.0), (10.0, 20.0, 103.0));
        assert!((dist - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance3d_combines_components() {
        // ~3.34m east at the equator, 4m up.
        let horizontal = geodesic_distance(0.0, 0.0, 0.0, 0.00003);
        assert!((horizontal - 3.34).abs() < 0.01, "got {horizontal}");
        let dist = distance3d((0.0, 0.0, 100.0), (0.0, 0.00003, 104.0));
        assert!((dist - (horizontal.powi(2) + 16.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_offset_by_bearing_round_trips_distance() {
        let (lat, lon) = offset_by_bearing(33.0, -117.0, 250.0, 45.0_f64.to_radians());
        let dist = geodesic_distance(33.0, -117.0, lat, lon);
        assert!((dist - 250.0).abs() < 1.0, "got {dist}");
    }

    #[test]
    fn test_total_path_length_sums_segments() {
        let (lat1, lon1) = offset_by_bearing(33.0, -117.0, 100.0, 0.0);
        let (lat2, lon2) = offset_by_bearing(lat1, lon1, 100.0, 90.0_f64.to_radians());
        let waypoints = vec![
            Waypoint::new(33.0, -117.0, 50.0),
            Waypoint::new(lat1, lon1, 50.0),
            Waypoint::new(lat2, lon2, 80.0),
        ];
        let legs = geodesic_distance(33.0, -117.0, lat1, lon1)
            + geodesic_distance(lat1, lon1, lat2, lon2);
        let total = total_path_length_m(&waypoints);
        assert!((total - legs).abs() < 1e-9);
        assert!((total - 200.0).abs() < 2.0, "got {total}");
        assert_eq!(total_path_length_m(&waypoints[..1]), 0.0);
    }
}

use crate::models::{Coordinate, Region};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle (haversine) distance between two points, rounded to whole kilometers.
///
/// Sub-kilometer separations round to 0; see [`format_distance`] for display.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = ((d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    (EARTH_RADIUS_KM * c).round()
}

/// Inclusive rectangle test in latitude/longitude space.
/// No geodesic correction and no antimeridian wrap.
pub fn is_within_region(point: Coordinate, region: &Region) -> bool {
    let lat = point.latitude();
    let lon = point.longitude();
    lat >= region.south() && lat <= region.north() && lon >= region.west() && lon <= region.east()
}

/// Render a distance for the player: whole meters under 1 km, whole kilometers otherwise.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} meters", (km * 1000.0).round() as i64)
    } else {
        format!("{} km", km.round() as i64)
    }
}

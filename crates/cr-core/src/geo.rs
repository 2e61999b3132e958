//! Great-circle helpers.

use crate::models::Location;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points, in meters.
///
/// The deltas go through `abs()` so `distance(a, b)` and `distance(b, a)`
/// are bit-for-bit equal.
pub fn distance(a: &Location, b: &Location) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (phi2 - phi1).abs();
    let d_lambda = (b.longitude.to_radians() - a.longitude.to_radians()).abs();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Link that opens the location in Google Maps.
pub fn maps_link(location: &Location) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        location.latitude, location.longitude
    )
}

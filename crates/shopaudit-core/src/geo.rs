//! Great-circle distance between latitude/longitude points.
//!
//! The earth is modelled as a sphere of radius [`EARTH_RADIUS_METERS`]; at
//! the tens-of-meters scale that visit validation works at, the error against
//! an ellipsoidal model is far below consumer GPS noise.

use serde::{Deserialize, Serialize};

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the WGS-84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Haversine distance in meters between `from` and `to`, rounded to two
/// decimal places.
#[must_use]
pub fn haversine_distance_m(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let half_lat = (d_lat / 2.0).sin();
    let half_lon = (d_lon / 2.0).sin();
    let a = half_lat * half_lat
        + from.latitude.to_radians().cos() * to.latitude.to_radians().cos() * half_lon * half_lon;
    // Rounding can push `a` just past 1 for near-antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to_centimeters(EARTH_RADIUS_METERS * c)
}

fn round_to_centimeters(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}

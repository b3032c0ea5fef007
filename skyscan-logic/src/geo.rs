use serde::{Deserialize, Serialize};

/// Mean radius of the earth used for great-circle distances, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A "part" of a coordinate, in decimal degrees
pub type Coordinate = f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Some point on the earth's surface as reported by a GPS receiver (WGS-84, no datum conversion)
pub struct GeoPoint {
    /// Latitude, -90 to 90
    pub latitude: Coordinate,
    /// Longitude, -180 to 180
    pub longitude: Coordinate,
}

impl GeoPoint {
    pub const fn new(latitude: Coordinate, longitude: Coordinate) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance between two points in kilometers, using the haversine formula.
///
/// Ranges aren't checked here, any finite input yields a finite, non-negative distance.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    // Rounding near the antipode can push h just past 1
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

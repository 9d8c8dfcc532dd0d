//! Planar pre-filter and great-circle math for area lookups.
//!
//! # Responsibility
//! - Convert a center/radius query into a clamped lat/lon bounding box.
//! - Compute haversine distance for the exact post-filter.
//!
//! # Invariants
//! - `BoundingBox::around` only approximates the circle. Its latitude span
//!   uses 111,320 m per degree while haversine uses a 6,371 km sphere
//!   (about 111,195 m per degree), so points due north or south within the
//!   last ~0.1% of the radius fall outside the box.
//! - Radius results are exact only for points inside the box: every
//!   returned point lies within the haversine radius.
//! - Longitudes are clamped to `[-180, 180]` and never wrapped across the
//!   antimeridian.
//! - Functions are pure and never panic on boundary input (poles, zero
//!   radius).

use serde::{Deserialize, Serialize};

/// Meters spanned by one degree of latitude.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;
/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
/// Floor for `cos(latitude)` so the longitude delta stays finite at poles.
const MIN_LONGITUDE_SCALE: f64 = 1e-6;

/// WGS84-style coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Inclusive axis-aligned rectangle in lat/lon space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn new(min_latitude: f64, max_latitude: f64, min_longitude: f64, max_longitude: f64) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    /// Approximates a circle of `radius_meters` around `center`.
    ///
    /// The result is clamped to the valid coordinate domain.
    pub fn around(center: GeoPoint, radius_meters: f64) -> Self {
        let lat_delta = radius_meters / METERS_PER_DEGREE_LATITUDE;
        let lon_scale = center
            .latitude
            .to_radians()
            .cos()
            .max(MIN_LONGITUDE_SCALE);
        let lon_delta = radius_meters / (METERS_PER_DEGREE_LATITUDE * lon_scale);

        Self {
            min_latitude: (center.latitude - lat_delta).max(-90.0),
            max_latitude: (center.latitude + lat_delta).min(90.0),
            min_longitude: (center.longitude - lon_delta).max(-180.0),
            max_longitude: (center.longitude + lon_delta).min(180.0),
        }
    }

    /// Whether `min <= max` holds on both axes.
    pub fn is_well_formed(&self) -> bool {
        self.min_latitude <= self.max_latitude && self.min_longitude <= self.max_longitude
    }

    /// Inclusive containment on both axes.
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `h` marginally above 1 for antipodal points.
    let central_angle = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_METERS * central_angle
}

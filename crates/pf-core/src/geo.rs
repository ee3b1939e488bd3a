//! Geographic coordinate types and spatial utilities.
//!
//! Coordinates are WGS-84 degrees in `f64`.  Road-network providers deliver
//! seven decimal places; single precision would round those to ~1 m and make
//! node snapping ties far more common.

use crate::{CoreError, CoreResult};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// `true` if both components are finite and inside the WGS-84 ranges.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lat, self.lon)
    }
}

/// Sum of haversine lengths along a polyline, in metres.
pub fn polyline_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned latitude/longitude box.
///
/// Field order matches the wire shape `[minLat, minLon, maxLat, maxLon]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Build a box, rejecting non-finite, out-of-range, or inverted bounds.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> CoreResult<Self> {
        let bbox = Self { min_lat, min_lon, max_lat, max_lon };
        let corners_ok = GeoPoint::new(min_lat, min_lon).is_valid()
            && GeoPoint::new(max_lat, max_lon).is_valid();
        if !corners_ok {
            return Err(CoreError::InvalidDescriptor(format!(
                "bounding box {bbox} has non-finite or out-of-range corners"
            )));
        }
        if min_lat > max_lat || min_lon > max_lon {
            return Err(CoreError::InvalidDescriptor(format!(
                "bounding box {bbox} has min greater than max"
            )));
        }
        Ok(bbox)
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lon >= self.min_lon
            && p.lon <= self.max_lon
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

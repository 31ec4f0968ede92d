//! Ellipsoidal polygon area.
//!
//! [`Bounds`](crate::Bounds) only needs one number out of the geodesic
//! machinery, so it talks to it through [`AreaCalculator`]. The default
//! implementation, [`Wgs84`], uses the `geo` crate's port of Karney's
//! algorithm on the WGS84 ellipsoid.

use geo::{GeodesicArea, LineString, Polygon};

/// Computes the signed area of a simple ring of `(lon, lat)` vertices.
///
/// The ring does not have to repeat its first vertex. Counter-clockwise rings
/// yield positive areas.
pub trait AreaCalculator {
    /// Signed area in square meters.
    fn signed_area(&self, ring: &[(f64, f64)]) -> f64;
}

/// Geodesic area on WGS84.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84;

impl AreaCalculator for Wgs84 {
    fn signed_area(&self, ring: &[(f64, f64)]) -> f64 {
        // Polygon::new closes the exterior ring.
        let polygon = Polygon::new(LineString::from(ring.to_vec()), vec![]);
        polygon.geodesic_area_signed()
    }
}

use serde::Serialize;

use crate::geodesy::{AreaCalculator, Wgs84};

/// Geographic extent of a changeset, in degrees.
///
/// Any coordinate may be missing: changesets without edits (or list entries
/// served without a bounding box) have no extent at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    min_lat: Option<f64>,
    min_lon: Option<f64>,
    max_lat: Option<f64>,
    max_lon: Option<f64>,
}

impl Bounds {
    /// Latitude first, as the API names the fields (`min_lat, min_lon, max_lat,
    /// max_lon`). Note that [`BoundingBox::new`](crate::BoundingBox::new) takes
    /// the `bbox` query order instead, longitude first.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self::from_parts(Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon))
    }

    pub fn from_parts(
        min_lat: Option<f64>,
        min_lon: Option<f64>,
        max_lat: Option<f64>,
        max_lon: Option<f64>,
    ) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Bounds with no coordinates.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn min_lat(&self) -> Option<f64> {
        self.min_lat
    }

    pub fn min_lon(&self) -> Option<f64> {
        self.min_lon
    }

    pub fn max_lat(&self) -> Option<f64> {
        self.max_lat
    }

    pub fn max_lon(&self) -> Option<f64> {
        self.max_lon
    }

    /// All four coordinates present and both extents strictly positive.
    pub fn is_valid(&self) -> bool {
        self.corners().is_some()
    }

    /// Geodesic area of the box on WGS84, in square meters. `0.0` when invalid.
    pub fn area(&self) -> f64 {
        self.area_with(&Wgs84)
    }

    /// Same as [`Bounds::area`] with a caller-supplied area collaborator.
    ///
    /// The collaborator is not consulted for invalid bounds.
    pub fn area_with<A: AreaCalculator + ?Sized>(&self, calculator: &A) -> f64 {
        match self.ring() {
            Some(ring) => calculator.signed_area(&ring[..4]).abs(),
            None => 0.0,
        }
    }

    /// Closed-ring `POLYGON((lon lat,...))` text, or `None` when invalid.
    pub fn wkt(&self) -> Option<String> {
        let ring = self.ring()?;
        let points = ring
            .iter()
            .map(|&(lon, lat)| format!("{} {}", coordinate_text(lon), coordinate_text(lat)))
            .collect::<Vec<_>>()
            .join(",");
        Some(format!("POLYGON(({}))", points))
    }

    /// GeoJSON `Polygon` with a single closed ring, or `None` when invalid.
    pub fn geojson(&self) -> Option<geojson::Geometry> {
        let ring = self.ring()?;
        let positions = ring.iter().map(|&(lon, lat)| vec![lon, lat]).collect();
        Some(geojson::Geometry::new(geojson::Value::Polygon(vec![
            positions,
        ])))
    }

    fn corners(&self) -> Option<(f64, f64, f64, f64)> {
        let (min_lat, min_lon, max_lat, max_lon) =
            (self.min_lat?, self.min_lon?, self.max_lat?, self.max_lon?);
        if max_lat - min_lat > 0.0 && max_lon - min_lon > 0.0 {
            Some((min_lat, min_lon, max_lat, max_lon))
        } else {
            None
        }
    }

    // Vertex order is part of the output format: min-min, then
    // counter-clockwise, then the first vertex again.
    fn ring(&self) -> Option<[(f64, f64); 5]> {
        let (min_lat, min_lon, max_lat, max_lon) = self.corners()?;
        Some([
            (min_lon, min_lat),
            (max_lon, min_lat),
            (max_lon, max_lat),
            (min_lon, max_lat),
            (min_lon, min_lat),
        ])
    }
}

/// Shortest round-trip text, with a signed two-digit exponent (`1e-05`) when
/// the value is written in scientific notation.
fn coordinate_text(value: f64) -> String {
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

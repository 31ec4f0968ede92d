use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::error::{Error, Result};

/// A bounding-box filter for changeset queries, in degrees.
///
/// Unlike [`Bounds`](crate::Bounds), a filter box may be degenerate (a point
/// or a line) but never inverted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Arguments follow the API's `bbox=min_lon,min_lat,max_lon,max_lat` order.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        if ![min_lon, min_lat, max_lon, max_lat].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidBbox(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        if min_lon > max_lon {
            return Err(Error::InvalidBbox(format!(
                "min_lon {} is greater than max_lon {}",
                min_lon, max_lon
            )));
        }
        if min_lat > max_lat {
            return Err(Error::InvalidBbox(format!(
                "min_lat {} is greater than max_lat {}",
                min_lat, max_lat
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }
}

impl TryFrom<&[f64]> for BoundingBox {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        match *values {
            [min_lon, min_lat, max_lon, max_lat] => {
                BoundingBox::new(min_lon, min_lat, max_lon, max_lat)
            }
            _ => Err(Error::InvalidBbox(format!(
                "expected 4 values (min_lon,min_lat,max_lon,max_lat), got {}",
                values.len()
            ))),
        }
    }
}

impl TryFrom<(f64, f64, f64, f64)> for BoundingBox {
    type Error = Error;

    fn try_from((min_lon, min_lat, max_lon, max_lat): (f64, f64, f64, f64)) -> Result<Self> {
        BoundingBox::new(min_lon, min_lat, max_lon, max_lat)
    }
}

/// Parses `min_lon,min_lat,max_lon,max_lat`.
impl FromStr for BoundingBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidBbox(format!("not a number: {:?}", part.trim())))
            })
            .collect::<Result<Vec<f64>>>()?;
        BoundingBox::try_from(values.as_slice())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// Filters for `GET /api/0.6/changesets.json`.
///
/// Only supplied filters are sent; `closed=true` is sent unless
/// [`ChangesetQuery::closed`] was set to `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangesetQuery {
    display_name: Option<String>,
    bbox: Option<BoundingBox>,
    closed: bool,
}

impl Default for ChangesetQuery {
    fn default() -> Self {
        Self {
            display_name: None,
            bbox: None,
            closed: true,
        }
    }
}

impl ChangesetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Rendered parameters, without the leading `?`. Empty when nothing applies.
    pub fn query_string(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(name) = &self.display_name {
            params.push((
                "display_name",
                form_urlencoded::byte_serialize(name.as_bytes()).collect(),
            ));
        }
        // Commas stay literal; the API reads them unescaped.
        if let Some(bbox) = &self.bbox {
            params.push(("bbox", bbox.to_string()));
        }
        if self.closed {
            params.push(("closed", "true".to_string()));
        }

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netherlands_bbox() {
        let bbox = BoundingBox::new(3.2, 50.8, 7.2, 53.6).unwrap();
        let query = ChangesetQuery::new().display_name("mvexel").bbox(bbox);
        let qs = query.query_string();
        assert!(qs.contains("bbox=3.2,50.8,7.2,53.6"));
        assert_eq!(qs, "display_name=mvexel&bbox=3.2,50.8,7.2,53.6&closed=true");
    }

    #[test]
    fn inverted_boxes_are_rejected() {
        assert!(matches!(
            BoundingBox::new(7.2, 50.8, 3.2, 53.6),
            Err(Error::InvalidBbox(_))
        ));
        assert!(matches!(
            BoundingBox::new(3.2, 53.6, 7.2, 50.8),
            Err(Error::InvalidBbox(_))
        ));
        assert!(BoundingBox::new(f64::NAN, 50.8, 7.2, 53.6).is_err());
    }

    #[test]
    fn degenerate_boxes_are_allowed() {
        assert!(BoundingBox::new(3.2, 50.8, 3.2, 50.8).is_ok());
    }

    #[test]
    fn arity_is_checked() {
        assert!(BoundingBox::try_from(&[3.2, 50.8, 7.2][..]).is_err());
        assert!(BoundingBox::try_from(&[3.2, 50.8, 7.2, 53.6, 1.0][..]).is_err());
        assert!("3.2,50.8,7.2".parse::<BoundingBox>().is_err());
        assert!("3.2,x,7.2,53.6".parse::<BoundingBox>().is_err());

        let parsed: BoundingBox = " 3.2, 50.8 ,7.2,53.6".parse().unwrap();
        assert_eq!(parsed, BoundingBox::try_from((3.2, 50.8, 7.2, 53.6)).unwrap());
    }

    #[test]
    fn only_supplied_filters_are_sent() {
        assert_eq!(ChangesetQuery::new().query_string(), "closed=true");
        assert_eq!(ChangesetQuery::new().closed(false).query_string(), "");
        assert_eq!(
            ChangesetQuery::new()
                .display_name("Some One")
                .closed(false)
                .query_string(),
            "display_name=Some+One"
        );
    }
}

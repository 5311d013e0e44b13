//! Geographic coordinate type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an out-of-range coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A validated WGS84 coordinate in decimal degrees.
///
/// Latitude is within [-90, 90] and longitude within [-180, 180] by
/// construction; both are finite.
///
/// # Examples
///
/// ```
/// use weather_engine::domain::Coordinate;
///
/// let helsinki = Coordinate::new(60.17, 24.94).unwrap();
/// assert_eq!(helsinki.lat(), 60.17);
///
/// // Out-of-range values are rejected
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(0.0, 180.5).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Construct a coordinate, validating both axes.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate {
                reason: "latitude must be a finite value within [-90, 90]",
            });
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate {
                reason: "longitude must be a finite value within [-180, 180]",
            });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Round both axes to `decimals` decimal degrees, returning the
    /// integer bucket pair used in cache keys.
    ///
    /// Nearby coordinates share a bucket so repeated lookups around
    /// the same venue hit the same cached rows.
    pub fn bucket(&self, decimals: u32) -> (i64, i64) {
        let scale = 10_i64.pow(decimals) as f64;
        (
            (self.lat * scale).round() as i64,
            (self.lon * scale).round() as i64,
        )
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

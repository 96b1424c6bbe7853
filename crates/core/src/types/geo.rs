//! Geographic coordinates.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`GeoPoint`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeoError {
    /// Latitude outside the valid range.
    #[error("latitude must be between -90 and 90 (got {0})")]
    LatitudeOutOfRange(f64),
    /// Longitude outside the valid range.
    #[error("longitude must be between -180 and 180 (got {0})")]
    LongitudeOutOfRange(f64),
}

/// A validated latitude/longitude pair.
///
/// Shop locations are stored as plain coordinate columns and exported to the
/// search index as a `[lat, lon]` geopoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Construct a point, validating coordinate bounds.
    ///
    /// # Errors
    ///
    /// Returns `GeoError` if latitude is outside [-90, 90] or longitude is
    /// outside [-180, 180]. Non-finite values are rejected by the same checks.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// The `[lat, lon]` array form used by the search index.
    #[must_use]
    pub const fn as_geopoint(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_points() {
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
        assert!(GeoPoint::new(90.0, -180.0).is_ok());
        assert!(GeoPoint::new(28.6139, 77.2090).is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        assert!(matches!(
            GeoPoint::new(90.5, 0.0),
            Err(GeoError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            GeoPoint::new(-91.0, 0.0),
            Err(GeoError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_longitude_out_of_range() {
        assert!(matches!(
            GeoPoint::new(0.0, 181.0),
            Err(GeoError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_nan_rejected() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_as_geopoint_order() {
        let point = GeoPoint::new(28.6139, 77.2090).unwrap();
        assert_eq!(point.as_geopoint(), [28.6139, 77.2090]);
    }
}

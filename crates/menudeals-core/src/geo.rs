//! Great-circle distance between two coordinates.
//!
//! All distances are kilometres rounded to one decimal place. The ranker
//! compares the rounded value against the search radius, so a deal 0.04 km
//! away counts as co-located.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance assigned to a deal whose restaurant has no usable coordinates.
///
/// Always greater than any finite radius, so the radius test drops the deal.
pub const UNKNOWN_DISTANCE_KM: f64 = f64::INFINITY;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude must be a finite number, got {0}")]
    NonFiniteLatitude(f64),
    #[error("longitude must be a finite number, got {0}")]
    NonFiniteLongitude(f64),
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] naming the offending component.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() {
            return Err(GeoError::NonFiniteLatitude(lat));
        }
        if !lng.is_finite() {
            return Err(GeoError::NonFiniteLongitude(lng));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Build a point from nullable store columns.
    ///
    /// Missing or invalid coordinates yield `None` instead of an error: a
    /// restaurant without a location is a data-quality gap, not a failed query.
    #[must_use]
    pub fn from_optional(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        let (lat, lng) = lat.zip(lng)?;
        Self::new(lat, lng).ok()
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Haversine distance between `a` and `b` in kilometres, rounded to 0.1 km.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    // Rounding can push `h` just past 1.0 for near-antipodal points.
    let h = ((dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    round_one_decimal(EARTH_RADIUS_KM * c)
}

/// Distance to an optional store location, falling back to [`UNKNOWN_DISTANCE_KM`].
#[must_use]
pub fn distance_or_unknown(from: GeoPoint, to: Option<GeoPoint>) -> f64 {
    to.map_or(UNKNOWN_DISTANCE_KM, |to| haversine_km(from, to))
}

fn round_one_decimal(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

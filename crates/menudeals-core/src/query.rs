//! Discovery query parsing.
//!
//! [`DiscoveryRequest`] is what arrives over the wire (query string or CLI
//! flags); [`DiscoveryQuery`] is the validated form the ranker works on.

use serde::Serialize;

use crate::deals::{DealCandidate, MealTime};
use crate::discovery::DiscoveryError;
use crate::geo::GeoPoint;
use crate::weekday::DaySelector;

/// Radius used when the caller does not send one.
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

const ANY_SENTINELS: [&str; 2] = ["all", "any"];
const ALL_CUISINE_LABEL: &str = "All Cuisine";
const ALL_DAY_LABEL: &str = "All day";

/// Unvalidated discovery parameters.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRequest {
    pub day: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub cuisine: Option<String>,
    pub meal_time: Option<String>,
    pub delivery: Option<String>,
    pub available_only: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CuisineFilter {
    #[default]
    Any,
    Only(String),
}

impl CuisineFilter {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Any,
            Some(value) if is_any_sentinel(value, ALL_CUISINE_LABEL) => Self::Any,
            Some(value) => Self::Only(value.to_string()),
        }
    }

    #[must_use]
    pub fn matches(&self, cuisine: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == cuisine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MealTimeFilter {
    #[default]
    Any,
    Only(MealTime),
}

impl MealTimeFilter {
    fn parse(raw: Option<&str>) -> Result<Self, DiscoveryError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Any),
            Some(value) if is_any_sentinel(value, ALL_DAY_LABEL) => Ok(Self::Any),
            Some(value) => MealTime::parse(value).map(Self::Only).ok_or_else(|| {
                DiscoveryError::ClientInput(format!("unrecognized meal time '{value}'"))
            }),
        }
    }

    #[must_use]
    pub fn matches(self, meal_time: MealTime) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == meal_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Any,
    Delivery,
    Collect,
}

impl DeliveryMode {
    fn parse(raw: Option<&str>) -> Result<Self, DiscoveryError> {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(Self::Any);
        };
        match value.to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "delivery" => Ok(Self::Delivery),
            "collect" => Ok(Self::Collect),
            _ => Err(DiscoveryError::ClientInput(format!(
                "unrecognized delivery mode '{value}'; expected any, delivery or collect"
            ))),
        }
    }

    #[must_use]
    pub fn matches(self, has_delivery: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Delivery => has_delivery,
            Self::Collect => !has_delivery,
        }
    }
}

/// A validated discovery query.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    pub day: DaySelector,
    pub origin: GeoPoint,
    pub radius_km: f64,
    pub cuisine: CuisineFilter,
    pub meal_time: MealTimeFilter,
    pub delivery: DeliveryMode,
    /// Keep only deals whose weekday set includes the resolved day.
    pub available_only: bool,
    /// Seed for the display shuffle; `None` draws from the OS.
    pub shuffle_seed: Option<u64>,
}

impl DiscoveryQuery {
    /// A query around `origin` with default radius and no filters.
    #[must_use]
    pub fn around(origin: GeoPoint) -> Self {
        Self {
            day: DaySelector::Today,
            origin,
            radius_km: DEFAULT_RADIUS_KM,
            cuisine: CuisineFilter::Any,
            meal_time: MealTimeFilter::Any,
            delivery: DeliveryMode::Any,
            available_only: false,
            shuffle_seed: None,
        }
    }

    /// Validate a request, filling an absent radius with `default_radius_km`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::ClientInput`] for a missing or invalid
    /// location, a negative or non-finite radius, an unknown day, meal time
    /// or delivery mode.
    pub fn from_request(
        request: &DiscoveryRequest,
        default_radius_km: f64,
    ) -> Result<Self, DiscoveryError> {
        let (lat, lng) = request
            .lat
            .zip(request.lng)
            .ok_or_else(|| DiscoveryError::ClientInput("lat and lng are required".to_string()))?;
        let origin =
            GeoPoint::new(lat, lng).map_err(|e| DiscoveryError::ClientInput(e.to_string()))?;

        let radius_km = request.radius_km.unwrap_or(default_radius_km);
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(DiscoveryError::ClientInput(format!(
                "radius_km must be a finite, non-negative number, got {radius_km}"
            )));
        }

        let day = match request.day.as_deref().map(str::trim) {
            None | Some("") => DaySelector::Today,
            Some(raw) => DaySelector::parse(raw)
                .ok_or_else(|| DiscoveryError::ClientInput(format!("unrecognized day '{raw}'")))?,
        };

        Ok(Self {
            day,
            origin,
            radius_km,
            cuisine: CuisineFilter::parse(request.cuisine.as_deref()),
            meal_time: MealTimeFilter::parse(request.meal_time.as_deref())?,
            delivery: DeliveryMode::parse(request.delivery.as_deref())?,
            available_only: request.available_only,
            shuffle_seed: request.seed,
        })
    }

    /// Whether a candidate passes the cuisine, meal time and delivery filters.
    #[must_use]
    pub fn accepts(&self, candidate: &DealCandidate) -> bool {
        self.cuisine.matches(&candidate.restaurant.cuisine)
            && self.meal_time.matches(candidate.deal.meal_time)
            && self.delivery.matches(candidate.restaurant.has_delivery)
    }
}

impl TryFrom<&DiscoveryRequest> for DiscoveryQuery {
    type Error = DiscoveryError;

    fn try_from(request: &DiscoveryRequest) -> Result<Self, Self::Error> {
        Self::from_request(request, DEFAULT_RADIUS_KM)
    }
}

fn is_any_sentinel(value: &str, label: &str) -> bool {
    value.eq_ignore_ascii_case(label)
        || ANY_SENTINELS
            .iter()
            .any(|sentinel| value.eq_ignore_ascii_case(sentinel))
}

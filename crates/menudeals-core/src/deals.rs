use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::CoreError;

/// Coarse meal slot a deal is offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealTime {
    Breakfast,
    Lunch,
    Dinner,
    AllDay,
}

impl MealTime {
    /// Parse a stored or user-supplied tag.
    ///
    /// Case-insensitive; `-` and spaces are read as `_`, so `All-Day`,
    /// `all_day` and `ALL_DAY` all name [`MealTime::AllDay`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        match normalized.as_str() {
            "BREAKFAST" => Some(Self::Breakfast),
            "LUNCH" => Some(Self::Lunch),
            "DINNER" => Some(Self::Dinner),
            "ALL_DAY" => Some(Self::AllDay),
            _ => None,
        }
    }

    /// Storage form, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "BREAKFAST",
            Self::Lunch => "LUNCH",
            Self::Dinner => "DINNER",
            Self::AllDay => "ALL_DAY",
        }
    }
}

impl std::fmt::Display for MealTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidMealTime(s.to_string()))
    }
}

/// What a client did with a deal card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementAction {
    View,
    Click,
}

impl EngagementAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
        }
    }
}

impl std::fmt::Display for EngagementAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EngagementAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "click" => Ok(Self::Click),
            _ => Err(CoreError::InvalidAction(s.to_string())),
        }
    }
}

/// The restaurant fields discovery needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantInfo {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub location: Option<GeoPoint>,
    pub has_delivery: bool,
    pub is_active: bool,
}

/// A deal as published by its restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct DealInfo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Decimal,
    pub meal_time: MealTime,
    /// Weekdays the deal runs on. Empty means every day.
    pub weekdays: Vec<Weekday>,
    pub is_active: bool,
}

impl DealInfo {
    #[must_use]
    pub fn savings(&self) -> Decimal {
        (self.original_price - self.price).max(Decimal::ZERO)
    }

    #[must_use]
    pub fn runs_on(&self, day: Weekday) -> bool {
        self.weekdays.is_empty() || self.weekdays.contains(&day)
    }
}

/// One row from the deal store: a deal joined with its owning restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct DealCandidate {
    pub deal: DealInfo,
    pub restaurant: RestaurantInfo,
}

impl DealCandidate {
    #[must_use]
    pub fn is_listed(&self) -> bool {
        self.deal.is_active && self.restaurant.is_active
    }
}

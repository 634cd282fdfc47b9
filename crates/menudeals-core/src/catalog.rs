//! Demo catalog of restaurants and their deals, kept in YAML.
//!
//! The catalog seeds the database and also backs offline queries through
//! [`StaticDealStore`](crate::StaticDealStore).

use std::collections::HashSet;
use std::path::Path;

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::read_yaml;
use crate::deals::{DealCandidate, DealInfo, MealTime, RestaurantInfo};
use crate::geo::GeoPoint;
use crate::ConfigError;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealConfig {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Decimal,
    pub meal_time: MealTime,
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantConfig {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub has_delivery: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub deals: Vec<DealConfig>,
}

impl RestaurantConfig {
    /// Coordinates, when both halves are present.
    ///
    /// Validation has already checked any present pair is in range.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_optional(self.latitude, self.longitude)
    }

    fn info(&self) -> RestaurantInfo {
        RestaurantInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            cuisine: self.cuisine.clone(),
            location: self.location(),
            has_delivery: self.has_delivery,
            is_active: self.is_active,
        }
    }
}

impl DealConfig {
    fn info(&self) -> DealInfo {
        DealInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            original_price: self.original_price,
            meal_time: self.meal_time,
            weekdays: self.weekdays.clone(),
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub restaurants: Vec<RestaurantConfig>,
}

impl CatalogFile {
    #[must_use]
    pub fn deal_count(&self) -> usize {
        self.restaurants.iter().map(|r| r.deals.len()).sum()
    }

    /// Flatten into store rows, one per deal.
    #[must_use]
    pub fn into_candidates(self) -> Vec<DealCandidate> {
        let mut candidates = Vec::with_capacity(self.deal_count());
        for restaurant in &self.restaurants {
            let info = restaurant.info();
            candidates.extend(restaurant.deals.iter().map(|deal| DealCandidate {
                deal: deal.info(),
                restaurant: info.clone(),
            }));
        }
        candidates
    }
}

/// Load and validate the catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let catalog: CatalogFile = read_yaml(path)?;
    validate_catalog(&catalog)?;
    tracing::debug!(
        path = %path.display(),
        restaurants = catalog.restaurants.len(),
        deals = catalog.deal_count(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Check ids, names, coordinates and prices.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first problem found.
pub fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut restaurant_ids = HashSet::new();
    let mut deal_ids = HashSet::new();

    for restaurant in &catalog.restaurants {
        if restaurant.id.trim().is_empty() || restaurant.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "restaurant id and name must be non-empty".to_string(),
            ));
        }
        if !restaurant_ids.insert(restaurant.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate restaurant id: '{}'",
                restaurant.id
            )));
        }
        match (restaurant.latitude, restaurant.longitude) {
            (Some(lat), Some(lng)) => {
                GeoPoint::new(lat, lng).map_err(|e| {
                    ConfigError::Validation(format!("restaurant '{}': {e}", restaurant.id))
                })?;
            }
            (None, None) => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "restaurant '{}' must set both latitude and longitude or neither",
                    restaurant.id
                )))
            }
        }

        for deal in &restaurant.deals {
            validate_deal(deal)?;
            if !deal_ids.insert(deal.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate deal id: '{}'",
                    deal.id
                )));
            }
        }
    }

    Ok(())
}

fn validate_deal(deal: &DealConfig) -> Result<(), ConfigError> {
    if deal.id.trim().is_empty() || deal.title.trim().is_empty() {
        return Err(ConfigError::Validation(
            "deal id and title must be non-empty".to_string(),
        ));
    }
    if deal.price < Decimal::ZERO || deal.original_price < Decimal::ZERO {
        return Err(ConfigError::Validation(format!(
            "deal '{}' has a negative price",
            deal.id
        )));
    }
    if deal.price > deal.original_price {
        return Err(ConfigError::Validation(format!(
            "deal '{}' price {} exceeds original price {}",
            deal.id, deal.price, deal.original_price
        )));
    }
    Ok(())
}

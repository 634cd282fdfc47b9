//! Domain core for MenuDeals deal discovery.
//!
//! Everything here is free of I/O except configuration loading; the deal
//! store is injected through [`DealStore`].

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod deals;
pub mod discovery;
pub mod featured;
pub mod geo;
pub mod query;
pub mod ranking;
pub mod session;
pub mod shuffle;
pub mod weekday;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, CatalogFile, DealConfig, RestaurantConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::{DealCandidate, DealInfo, EngagementAction, MealTime, RestaurantInfo};
pub use discovery::{
    DealStore, DiscoveryError, DiscoveryResult, DiscoveryService, StaticDealStore,
};
pub use featured::{load_featured, FeaturedSchedule};
pub use geo::{haversine_km, GeoError, GeoPoint};
pub use query::{DeliveryMode, DiscoveryQuery, DiscoveryRequest, DEFAULT_RADIUS_KM};
pub use ranking::{rank_deals, RankedDeal};
pub use session::SessionContext;
pub use weekday::{day_strip, Clock, DaySelector, FixedClock, SystemClock};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid meal time: {0}")]
    InvalidMealTime(String),

    #[error("invalid engagement action: {0}")]
    InvalidAction(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    FileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config validation failed: {0}")]
    Validation(String),
}

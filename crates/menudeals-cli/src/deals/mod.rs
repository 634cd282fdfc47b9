//! `deals` subcommands: offline or database-backed discovery queries and the
//! day strip.

mod search;

use std::path::PathBuf;

use clap::{Args, Subcommand};
use menudeals_core::{day_strip, Clock, DiscoveryRequest, SystemClock};

pub(crate) use search::run_deals_search;

/// Sub-commands available under `deals`.
#[derive(Debug, Subcommand)]
pub enum DealsCommands {
    /// Find deals around a point
    Search(SearchArgs),
    /// Print the seven-day picker strip for today
    Days {
        /// Market offset from UTC in minutes
        #[arg(
            long,
            env = "MENUDEALS_UTC_OFFSET_MINUTES",
            default_value_t = 120,
            allow_hyphen_values = true
        )]
        utc_offset_minutes: i32,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Requester latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,
    /// Requester longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,
    /// Search radius in km (defaults to MENUDEALS_DEFAULT_RADIUS_KM, or 25 with --catalog)
    #[arg(long)]
    pub radius_km: Option<f64>,
    /// Weekday name or "Today"
    #[arg(long)]
    pub day: Option<String>,
    /// Exact cuisine tag, or "All Cuisine"
    #[arg(long)]
    pub cuisine: Option<String>,
    /// Breakfast, Lunch, Dinner, All-Day, or "All day" for no filter
    #[arg(long)]
    pub meal_time: Option<String>,
    /// any, delivery or collect
    #[arg(long)]
    pub delivery: Option<String>,
    /// Only deals that run on the selected day
    #[arg(long)]
    pub available_only: bool,
    /// Seed for a reproducible display order
    #[arg(long)]
    pub seed: Option<u64>,
    /// Serve deals from this catalog YAML instead of the database
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// List non-featured deals nearest first instead of shuffled
    #[arg(long)]
    pub by_distance: bool,
    /// Featured schedule YAML
    #[arg(
        long,
        env = "MENUDEALS_FEATURED_PATH",
        default_value = "./config/featured.yaml"
    )]
    pub featured: PathBuf,
    /// Market offset from UTC in minutes
    #[arg(
        long,
        env = "MENUDEALS_UTC_OFFSET_MINUTES",
        default_value_t = 120,
        allow_hyphen_values = true
    )]
    pub utc_offset_minutes: i32,
}

impl SearchArgs {
    pub(crate) fn discovery_request(&self) -> DiscoveryRequest {
        DiscoveryRequest {
            day: self.day.clone(),
            lat: Some(self.lat),
            lng: Some(self.lng),
            radius_km: self.radius_km,
            cuisine: self.cuisine.clone(),
            meal_time: self.meal_time.clone(),
            delivery: self.delivery.clone(),
            available_only: self.available_only,
            seed: self.seed,
        }
    }
}

fn system_clock(utc_offset_minutes: i32) -> anyhow::Result<SystemClock> {
    SystemClock::from_offset_minutes(utc_offset_minutes).ok_or_else(|| {
        anyhow::anyhow!("UTC offset of {utc_offset_minutes} minutes is out of range")
    })
}

/// Dispatch a `deals` subcommand.
///
/// # Errors
///
/// Returns an error if the query is invalid or the deal source fails.
pub(crate) async fn run_deals(command: DealsCommands) -> anyhow::Result<()> {
    match command {
        DealsCommands::Search(args) => run_deals_search(&args).await,
        DealsCommands::Days { utc_offset_minutes } => {
            let today = system_clock(utc_offset_minutes)?.today();
            println!("{}", day_strip(today).join("  "));
            Ok(())
        }
    }
}

use std::sync::Arc;

use menudeals_core::{
    load_catalog, load_featured, weekday::weekday_name, DealStore, DiscoveryQuery,
    DiscoveryResult, DiscoveryService, FeaturedSchedule, RankedDeal, StaticDealStore,
    SystemClock, DEFAULT_RADIUS_KM,
};
use menudeals_db::PgDealStore;
use rand::{rngs::StdRng, SeedableRng};

use super::{system_clock, SearchArgs};

const TITLE_WIDTH: usize = 28;

/// Run a discovery query and print the result as a table.
///
/// With `--catalog` the deals come straight from the YAML file and no
/// database is needed; otherwise they are read from Postgres.
///
/// # Errors
///
/// Returns an error if the query is invalid, a config file fails to load, or
/// the deal source fails.
pub(crate) async fn run_deals_search(args: &SearchArgs) -> anyhow::Result<()> {
    let schedule = Arc::new(load_featured(&args.featured)?);
    let clock = system_clock(args.utc_offset_minutes)?;

    let (query, result) = if let Some(path) = &args.catalog {
        let query = search_query(args, DEFAULT_RADIUS_KM)?;
        let catalog = load_catalog(path)?;
        tracing::debug!(path = %path.display(), deals = catalog.deal_count(), "using catalog store");
        let store = StaticDealStore::new(catalog.into_candidates());
        let result = discover(store, clock, schedule, &query).await?;
        (query, result)
    } else {
        let config = menudeals_core::load_app_config()?;
        let query = search_query(args, config.default_radius_km)?;
        let pool_config = menudeals_db::PoolConfig::from_app_config(&config);
        let pool = menudeals_db::connect_pool(&config.database_url, pool_config).await?;
        let result = discover(PgDealStore::new(pool), clock, schedule, &query).await?;
        (query, result)
    };

    let deals = if args.by_distance {
        result.by_distance()
    } else {
        result.for_display()
    };

    println!(
        "{}: {} deal(s) within {} km",
        weekday_name(result.weekday),
        deals.len(),
        query.radius_km
    );
    if deals.is_empty() {
        return Ok(());
    }
    println!("{}", header());
    for deal in &deals {
        println!("{}", format_row(deal));
    }

    Ok(())
}

/// Validate the search flags; an omitted `--radius-km` takes `default_radius_km`.
fn search_query(args: &SearchArgs, default_radius_km: f64) -> anyhow::Result<DiscoveryQuery> {
    Ok(DiscoveryQuery::from_request(
        &args.discovery_request(),
        default_radius_km,
    )?)
}

async fn discover<S: DealStore>(
    store: S,
    clock: SystemClock,
    schedule: Arc<FeaturedSchedule>,
    query: &DiscoveryQuery,
) -> anyhow::Result<DiscoveryResult> {
    let mut rng = match query.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let service = DiscoveryService::new(store, clock, schedule);
    Ok(service.discover(query, &mut rng).await?)
}

fn header() -> String {
    format!(
        "{:<4}{:<6}{:<30}{:<24}{:<14}{:<11}{:>9}{:>9}{:>8}",
        "", "DEAL", "TITLE", "RESTAURANT", "CUISINE", "MEAL", "PRICE", "SAVE", "KM"
    )
}

fn format_row(deal: &RankedDeal) -> String {
    let marker = deal
        .featured_position
        .map(|p| format!("*{p}"))
        .unwrap_or_default();
    let title = if deal.title.chars().count() > TITLE_WIDTH {
        format!(
            "{}...",
            deal.title.chars().take(TITLE_WIDTH - 3).collect::<String>()
        )
    } else {
        deal.title.clone()
    };
    format!(
        "{:<4}{:<6}{:<30}{:<24}{:<14}{:<11}{:>9}{:>9}{:>8.1}",
        marker,
        deal.deal_id,
        title,
        deal.restaurant_name,
        deal.cuisine,
        deal.meal_time.as_str(),
        deal.price.round_dp(2).to_string(),
        deal.savings.round_dp(2).to_string(),
        deal.distance_km
    )
}

//! Live integration tests for menudeals-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/menudeals-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use std::path::Path;
use std::sync::Arc;

use chrono::{FixedOffset, TimeZone, Weekday};
use menudeals_core::{
    load_catalog, CatalogFile, DaySelector, DiscoveryQuery, DiscoveryService, EngagementAction,
    FeaturedSchedule, FixedClock, GeoPoint,
};
use menudeals_db::{
    count_deal_events, list_active_deal_candidates, record_deal_event, seed_catalog,
    DbError, PgDealStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bundled_catalog() -> CatalogFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/catalog.yaml");
    load_catalog(&path).expect("bundled catalog loads")
}

async fn seeded(pool: &sqlx::PgPool) -> CatalogFile {
    let catalog = bundled_catalog();
    seed_catalog(pool, &catalog).await.expect("seed_catalog failed");
    catalog
}

fn emalahleni() -> GeoPoint {
    GeoPoint::new(-25.8758, 29.2364).unwrap()
}

// ---------------------------------------------------------------------------
// Section 1: Seeding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn seed_catalog_counts_rows(pool: sqlx::PgPool) {
    let catalog = bundled_catalog();
    let summary = seed_catalog(&pool, &catalog).await.expect("seed");

    assert_eq!(summary.restaurants, catalog.restaurants.len());
    assert_eq!(summary.deals, catalog.deal_count());

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, i64::try_from(catalog.deal_count()).unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn seed_catalog_is_idempotent_and_updates(pool: sqlx::PgPool) {
    let mut catalog = seeded(&pool).await;
    catalog.restaurants[0].deals[0].title = "Renamed Combo".to_string();
    seed_catalog(&pool, &catalog).await.expect("reseed");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, i64::try_from(catalog.deal_count()).unwrap());

    let title: String = sqlx::query_scalar("SELECT title FROM deals WHERE id = '1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(title, "Renamed Combo");
}

// ---------------------------------------------------------------------------
// Section 2: Deal listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_active_candidates_excludes_inactive_deals(pool: sqlx::PgPool) {
    seeded(&pool).await;
    let candidates = list_active_deal_candidates(&pool).await.expect("list");

    assert!(candidates.iter().all(|c| c.is_listed()));
    assert!(!candidates.iter().any(|c| c.deal.id == "17"));

    let kota = candidates
        .iter()
        .find(|c| c.deal.id == "21")
        .expect("deal without coordinates is still listed");
    assert!(kota.restaurant.location.is_none());

    let margherita = candidates.iter().find(|c| c.deal.id == "4").unwrap();
    assert_eq!(margherita.deal.weekdays, vec![Weekday::Tue, Weekday::Wed]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deactivated_restaurant_hides_its_deals(pool: sqlx::PgPool) {
    seeded(&pool).await;
    sqlx::query("UPDATE restaurants SET is_active = FALSE WHERE id = 'rest-tokyo-bites'")
        .execute(&pool)
        .await
        .unwrap();

    let candidates = list_active_deal_candidates(&pool).await.unwrap();
    assert!(!candidates.iter().any(|c| c.restaurant.id == "rest-tokyo-bites"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn discovery_over_postgres_pins_wednesday_features(pool: sqlx::PgPool) {
    seeded(&pool).await;
    let schedule = FeaturedSchedule::from_entries([(
        Weekday::Wed,
        vec!["4".to_string(), "11".to_string(), "6".to_string()],
    )])
    .unwrap();
    let sast = FixedOffset::east_opt(2 * 3600).unwrap();
    let clock = FixedClock(sast.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap());
    let service = DiscoveryService::new(PgDealStore::new(pool.clone()), clock, Arc::new(schedule));

    let mut query = DiscoveryQuery::around(emalahleni());
    query.day = DaySelector::Today;
    let result = service
        .discover(&query, &mut StdRng::seed_from_u64(3))
        .await
        .expect("discover");

    let featured: Vec<&str> = result.featured.iter().map(|d| d.deal_id.as_str()).collect();
    assert_eq!(featured, ["4", "11", "6"]);
    assert!(result.by_distance().iter().all(|d| d.distance_km <= 25.0));
    assert!(!result.by_distance().iter().any(|d| d.deal_id == "21" || d.deal_id == "22"));
}

// ---------------------------------------------------------------------------
// Section 3: Engagement events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn record_event_for_known_deal(pool: sqlx::PgPool) {
    seeded(&pool).await;

    record_deal_event(&pool, "1", EngagementAction::View, Some("req-1"))
        .await
        .expect("record view");
    record_deal_event(&pool, "1", EngagementAction::Click, None)
        .await
        .expect("record click");
    record_deal_event(&pool, "1", EngagementAction::Click, None)
        .await
        .expect("record click");

    assert_eq!(
        count_deal_events(&pool, "1", EngagementAction::View).await.unwrap(),
        1
    );
    assert_eq!(
        count_deal_events(&pool, "1", EngagementAction::Click).await.unwrap(),
        2
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn record_event_for_unknown_deal_is_not_found(pool: sqlx::PgPool) {
    seeded(&pool).await;

    let err = record_deal_event(&pool, "999", EngagementAction::View, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

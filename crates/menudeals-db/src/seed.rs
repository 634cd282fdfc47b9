use menudeals_core::catalog::CatalogFile;
use menudeals_core::weekday::weekday_name;
use sqlx::PgPool;

use crate::DbError;

/// Counts of catalog rows written by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub restaurants: usize,
    pub deals: usize,
}

/// Upsert every restaurant and deal from the catalog.
///
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back. Rows absent from the catalog are left
/// untouched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(pool: &PgPool, catalog: &CatalogFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for restaurant in &catalog.restaurants {
        sqlx::query(
            "INSERT INTO restaurants (id, name, cuisine, address, latitude, longitude, has_delivery, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 cuisine = EXCLUDED.cuisine, \
                 address = EXCLUDED.address, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 has_delivery = EXCLUDED.has_delivery, \
                 is_active = EXCLUDED.is_active, \
                 updated_at = NOW()",
        )
        .bind(&restaurant.id)
        .bind(&restaurant.name)
        .bind(&restaurant.cuisine)
        .bind(&restaurant.address)
        .bind(restaurant.latitude)
        .bind(restaurant.longitude)
        .bind(restaurant.has_delivery)
        .bind(restaurant.is_active)
        .execute(&mut *tx)
        .await?;
        summary.restaurants += 1;

        for deal in &restaurant.deals {
            let weekdays: Vec<String> = deal
                .weekdays
                .iter()
                .map(|d| weekday_name(*d).to_string())
                .collect();

            sqlx::query(
                "INSERT INTO deals (id, restaurant_id, title, description, price, original_price, meal_time, weekdays, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 ON CONFLICT (id) DO UPDATE SET \
                     restaurant_id = EXCLUDED.restaurant_id, \
                     title = EXCLUDED.title, \
                     description = EXCLUDED.description, \
                     price = EXCLUDED.price, \
                     original_price = EXCLUDED.original_price, \
                     meal_time = EXCLUDED.meal_time, \
                     weekdays = EXCLUDED.weekdays, \
                     is_active = EXCLUDED.is_active, \
                     updated_at = NOW()",
            )
            .bind(&deal.id)
            .bind(&restaurant.id)
            .bind(&deal.title)
            .bind(&deal.description)
            .bind(deal.price)
            .bind(deal.original_price)
            .bind(deal.meal_time.as_str())
            .bind(&weekdays)
            .bind(deal.is_active)
            .execute(&mut *tx)
            .await?;
            summary.deals += 1;
        }
    }

    tx.commit().await?;
    tracing::info!(
        restaurants = summary.restaurants,
        deals = summary.deals,
        "catalog seeded"
    );
    Ok(summary)
}

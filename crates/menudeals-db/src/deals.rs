//! Reads over `deals` joined with `restaurants`.

use chrono::Weekday;
use menudeals_core::{DealCandidate, DealInfo, DealStore, GeoPoint, MealTime, RestaurantInfo};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// One deal joined with its owning restaurant.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealCandidateRow {
    pub deal_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Decimal,
    pub meal_time: String,
    pub weekdays: Vec<String>,
    pub deal_is_active: bool,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub cuisine: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_delivery: bool,
    pub restaurant_is_active: bool,
}

impl TryFrom<DealCandidateRow> for DealCandidate {
    type Error = DbError;

    fn try_from(row: DealCandidateRow) -> Result<Self, Self::Error> {
        let meal_time: MealTime = row.meal_time.parse().map_err(|_| {
            DbError::InvalidData(format!(
                "deal {} has meal_time '{}'",
                row.deal_id, row.meal_time
            ))
        })?;

        let weekdays = row
            .weekdays
            .iter()
            .map(|raw| {
                raw.parse::<Weekday>().map_err(|_| {
                    DbError::InvalidData(format!("deal {} has weekday '{raw}'", row.deal_id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DealCandidate {
            deal: DealInfo {
                id: row.deal_id,
                title: row.title,
                description: row.description,
                price: row.price,
                original_price: row.original_price,
                meal_time,
                weekdays,
                is_active: row.deal_is_active,
            },
            restaurant: RestaurantInfo {
                id: row.restaurant_id,
                name: row.restaurant_name,
                cuisine: row.cuisine,
                location: GeoPoint::from_optional(row.latitude, row.longitude),
                has_delivery: row.has_delivery,
                is_active: row.restaurant_is_active,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every active deal of an active restaurant, ordered by deal id.
///
/// Rows with unreadable tags are skipped with a warning rather than failing
/// the whole listing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_deal_candidates(pool: &PgPool) -> Result<Vec<DealCandidate>, DbError> {
    let rows = sqlx::query_as::<_, DealCandidateRow>(
        "SELECT d.id AS deal_id, d.title, d.description, d.price, d.original_price, \
                d.meal_time, d.weekdays, d.is_active AS deal_is_active, \
                r.id AS restaurant_id, r.name AS restaurant_name, r.cuisine, \
                r.latitude, r.longitude, r.has_delivery, r.is_active AS restaurant_is_active \
         FROM deals d \
         JOIN restaurants r ON r.id = d.restaurant_id \
         WHERE d.is_active = TRUE AND r.is_active = TRUE \
         ORDER BY d.id",
    )
    .fetch_all(pool)
    .await?;

    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        match DealCandidate::try_from(row) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable deal row"),
        }
    }
    Ok(candidates)
}

// ---------------------------------------------------------------------------
// Deal store
// ---------------------------------------------------------------------------

/// [`DealStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgDealStore {
    pool: PgPool,
}

impl PgDealStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DealStore for PgDealStore {
    type Error = DbError;

    async fn list_active_candidates(&self) -> Result<Vec<DealCandidate>, Self::Error> {
        list_active_deal_candidates(&self.pool).await
    }
}

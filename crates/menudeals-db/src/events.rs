//! Engagement events (`deal_events`).

use menudeals_core::EngagementAction;
use sqlx::PgPool;

use crate::DbError;

/// Record a view or click against a deal and return the event id.
///
/// The insert selects from `deals`, so an unknown id writes nothing.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no deal has this id, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn record_deal_event(
    pool: &PgPool,
    deal_id: &str,
    action: EngagementAction,
    request_id: Option<&str>,
) -> Result<i64, DbError> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO deal_events (deal_id, action, request_id) \
         SELECT id, $2, $3 FROM deals WHERE id = $1 \
         RETURNING id",
    )
    .bind(deal_id)
    .bind(action.as_str())
    .bind(request_id)
    .fetch_optional(pool)
    .await?;

    id.ok_or(DbError::NotFound)
}

/// Number of recorded events of `action` for a deal.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_deal_events(
    pool: &PgPool,
    deal_id: &str,
    action: EngagementAction,
) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM deal_events WHERE deal_id = $1 AND action = $2",
    )
    .bind(deal_id)
    .bind(action.as_str())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

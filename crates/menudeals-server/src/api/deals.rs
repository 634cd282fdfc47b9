//! Deal discovery and engagement handlers.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use menudeals_core::{
    Clock, DiscoveryQuery, DiscoveryRequest, EngagementAction, RankedDeal, SessionContext,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, map_discovery_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Query and body types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum DealOrder {
    #[default]
    Display,
    Distance,
}

/// Query string for `GET /api/v1/deals`.
///
/// Fields are spelled out rather than flattened from [`DiscoveryRequest`];
/// urlencoded numbers do not survive `#[serde(flatten)]`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct DealsParams {
    pub day: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub cuisine: Option<String>,
    pub meal_time: Option<String>,
    pub delivery: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    #[serde(default)]
    pub order: DealOrder,
    pub seed: Option<u64>,
    pub promo_last_seen: Option<NaiveDate>,
}

impl DealsParams {
    fn discovery_request(&self) -> DiscoveryRequest {
        DiscoveryRequest {
            day: self.day.clone(),
            lat: self.lat,
            lng: self.lng,
            radius_km: self.radius_km,
            cuisine: self.cuisine.clone(),
            meal_time: self.meal_time.clone(),
            delivery: self.delivery.clone(),
            available_only: self.available_only,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DealsData {
    pub weekday: &'static str,
    pub order: DealOrder,
    /// Local date the response was computed for.
    pub today: NaiveDate,
    pub deals: Vec<RankedDeal>,
    pub show_daily_promo: bool,
    pub promo: Option<RankedDeal>,
    /// Updated client state; sent back as `promo_last_seen` on the next call.
    pub session: SessionContext,
}

#[derive(Debug, Deserialize)]
pub(super) struct EventRequest {
    pub action: String,
}

#[derive(Debug, Serialize)]
pub(super) struct EventCreated {
    pub event_id: i64,
    pub deal_id: String,
    pub action: EngagementAction,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn list_deals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<DealsParams>, QueryRejection>,
) -> Result<Json<ApiResponse<DealsData>>, ApiError> {
    let Query(params) = params
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let query = DiscoveryQuery::from_request(&params.discovery_request(), state.default_radius_km)
        .map_err(|e| map_discovery_error(req_id.0.clone(), &e))?;

    let mut rng = match query.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let result = state
        .discovery
        .discover(&query, &mut rng)
        .await
        .map_err(|e| map_discovery_error(req_id.0.clone(), &e))?;

    let today = state.discovery.clock().now().date_naive();
    let mut session = SessionContext::new(params.promo_last_seen);
    let promo = result.promo().cloned();
    let show_daily_promo = promo.is_some() && session.should_show_daily_promo(today);
    if show_daily_promo {
        session.mark_promo_seen(today);
    }

    let deals = match params.order {
        DealOrder::Display => result.for_display(),
        DealOrder::Distance => result.by_distance(),
    };

    tracing::info!(
        weekday = menudeals_core::weekday::weekday_name(result.weekday),
        count = deals.len(),
        featured = result.featured.len(),
        radius_km = query.radius_km,
        "deals listed"
    );

    Ok(Json(ApiResponse {
        data: DealsData {
            weekday: menudeals_core::weekday::weekday_name(result.weekday),
            order: params.order,
            today,
            deals,
            show_daily_promo,
            promo,
            session,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn record_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(deal_id): Path<String>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<EventCreated>>), ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let action: EngagementAction = body.action.parse().map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("action must be 'view' or 'click', got '{}'", body.action),
        )
    })?;

    let event_id = menudeals_db::record_deal_event(&state.pool, &deal_id, action, Some(&req_id.0))
        .await
        .map_err(|e| match e {
            menudeals_db::DbError::NotFound => ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("deal '{deal_id}' not found"),
            ),
            other => map_db_error(req_id.0.clone(), &other),
        })?;

    tracing::debug!(deal_id = %deal_id, action = %action, event_id, "deal event recorded");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: EventCreated {
                event_id,
                deal_id,
                action,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

mod days;
mod deals;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use menudeals_core::{Clock, DiscoveryError, DiscoveryService};
use menudeals_db::PgDealStore;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, ClientRateLimiter, RequestId};

/// Discovery over Postgres with an injectable clock.
pub type DealDiscovery = DiscoveryService<PgDealStore, Arc<dyn Clock>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub discovery: Arc<DealDiscovery>,
    pub default_radius_km: f64,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "data_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &menudeals_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_discovery_error(request_id: String, error: &DiscoveryError) -> ApiError {
    match error {
        DiscoveryError::ClientInput(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        DiscoveryError::DataUnavailable(source) => {
            tracing::error!(error = %source, "deal store unavailable");
            ApiError::new(request_id, "data_unavailable", "deal data is unavailable")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

/// Routes that hit the deal store, throttled per client.
fn deal_routes(limiter: ClientRateLimiter) -> Router<AppState> {
    Router::new()
        .route("/api/v1/deals", get(deals::list_deals))
        .route(
            "/api/v1/deals/{deal_id}/events",
            post(deals::record_event),
        )
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, limiter: ClientRateLimiter) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/days", get(days::list_days))
        .merge(deal_routes(limiter))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match menudeals_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{app, get, send, state_with, unreachable_pool, wednesday_clock};
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_data_unavailable_maps_to_503() {
        let response = ApiError::new("req-1", "data_unavailable", "down").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn discovery_errors_map_to_envelope_codes() {
        let client = map_discovery_error(
            "req-1".to_string(),
            &DiscoveryError::ClientInput("lat and lng are required".to_string()),
        );
        assert_eq!(client.error.code, "validation_error");
        assert_eq!(client.error.message, "lat and lng are required");

        let store = map_discovery_error(
            "req-2".to_string(),
            &DiscoveryError::DataUnavailable(Box::new(menudeals_db::DbError::NotFound)),
        );
        assert_eq!(store.error.code, "data_unavailable");
        assert_eq!(store.meta.request_id, "req-2");
    }

    #[tokio::test]
    async fn health_reports_degraded_without_database() {
        let app = app(state_with(unreachable_pool(), wednesday_clock()));
        let (status, json) = get(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["data"]["database"], "unavailable");
    }

    #[tokio::test]
    async fn request_id_header_is_echoed() {
        let app = app(state_with(unreachable_pool(), wednesday_clock()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/days")
                    .header("x-request-id", "req-fixed")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("req-fixed")
        );
    }

    fn from_client(uri: &str, client: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", client)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn deal_routes_are_throttled_per_client() {
        let state = state_with(unreachable_pool(), wednesday_clock());
        let app = build_app(state, ClientRateLimiter::per_minute(2));
        let uri = "/api/v1/deals?lat=-25.8758&lng=29.2364&radius_km=-1";

        for _ in 0..2 {
            let (status, _) = send(app.clone(), from_client(uri, "41.13.2.9")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let response = app
            .clone()
            .oneshot(from_client(uri, "41.13.2.9"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));

        let (status, _) = send(app, from_client(uri, "102.65.7.1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn days_route_is_not_throttled() {
        let state = state_with(unreachable_pool(), wednesday_clock());
        let app = build_app(state, ClientRateLimiter::per_minute(1));

        for _ in 0..3 {
            let (status, _) = get(app.clone(), "/api/v1/days").await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn malformed_request_id_is_replaced() {
        let app = app(state_with(unreachable_pool(), wednesday_clock()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/days")
                    .header("x-request-id", "bad id;drop")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let echoed = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .expect("request id header");
        assert_ne!(echoed, "bad id;drop");
        assert!(uuid::Uuid::parse_str(echoed).is_ok());
    }
}

use axum::{extract::State, Extension, Json};
use menudeals_core::{day_strip, weekday::weekday_name, Clock};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct DaysData {
    pub today: &'static str,
    pub days: Vec<String>,
}

pub(super) async fn list_days(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<DaysData>> {
    let today = state.discovery.clock().today();

    Json(ApiResponse {
        data: DaysData {
            today: weekday_name(today),
            days: day_strip(today),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{app, get, state_with, unreachable_pool, wednesday_clock};

    #[tokio::test]
    async fn days_strip_opens_on_yesterday() {
        let app = app(state_with(unreachable_pool(), wednesday_clock()));
        let (status, json) = get(app, "/api/v1/days").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["today"], "Wednesday");
        let days: Vec<&str> = json["data"]["days"]
            .as_array()
            .expect("days array")
            .iter()
            .filter_map(|d| d.as_str())
            .collect();
        assert_eq!(
            days,
            [
                "Tuesday", "Today", "Thursday", "Friday", "Saturday", "Sunday", "Monday"
            ]
        );
        assert!(json["meta"]["request_id"].is_string());
    }
}

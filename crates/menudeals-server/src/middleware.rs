//! Request correlation and per-client throttling for the deal routes.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 64;

/// Correlation id for one request, stored as a request extension and echoed
/// in the envelope's `meta.request_id`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Client-supplied ids are kept only when short and made of `[A-Za-z0-9._-]`,
/// since they end up in `deal_events.request_id` and in log lines.
fn accepted_request_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let valid = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    valid.then(|| raw.to_string())
}

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = accepted_request_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Identify the caller: first `x-forwarded-for` hop when behind a proxy,
/// otherwise the peer address, otherwise a shared bucket.
fn client_key(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(hop) = forwarded {
        return hop.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window request budget tracked separately for every client.
///
/// Windows that have expired are dropped whenever a new client shows up, so
/// the map only holds callers seen within the last window.
#[derive(Debug, Clone)]
pub struct ClientRateLimiter {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl ClientRateLimiter {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Count one request from `client` at `now`.
    ///
    /// Returns the time left in the client's window when the budget is spent.
    pub async fn check(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut clients = self.clients.lock().await;

        if !clients.contains_key(client) {
            let window = self.window;
            clients.retain(|_, w| now.saturating_duration_since(w.started_at) < window);
        }

        let entry = clients.entry(client.to_string()).or_insert(ClientWindow {
            started_at: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(entry.started_at);
        if elapsed >= self.window {
            *entry = ClientWindow {
                started_at: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            return Err(self.window.saturating_sub(elapsed));
        }
        entry.count += 1;
        Ok(())
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}

#[derive(Debug, Serialize)]
struct ThrottledBody {
    error: ThrottledError,
}

#[derive(Debug, Serialize)]
struct ThrottledError {
    code: &'static str,
    message: String,
}

pub async fn enforce_rate_limit(
    State(limiter): State<ClientRateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_key(&req);
    match limiter.check(&client, Instant::now()).await {
        Ok(()) => next.run(req).await,
        Err(retry_in) => {
            let retry_secs = retry_in.as_secs().max(1);
            tracing::debug!(client = %client, retry_secs, "client rate limit exceeded");
            let mut res = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ThrottledBody {
                    error: ThrottledError {
                        code: "rate_limited",
                        message: format!("too many requests; retry in {retry_secs}s"),
                    },
                }),
            )
                .into_response();
            res.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_secs));
            res
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with(headers: &[(&str, &str)]) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/v1/deals");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[test]
    fn keeps_well_formed_request_id() {
        let req = request_with(&[("x-request-id", "web-7f3a_01.b")]);
        assert_eq!(
            accepted_request_id(req.headers()).as_deref(),
            Some("web-7f3a_01.b")
        );
    }

    #[test]
    fn replaces_malformed_request_ids() {
        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        for bad in ["", "   ", "has space", "semi;colon", long.as_str()] {
            let req = request_with(&[("x-request-id", bad)]);
            assert_eq!(accepted_request_id(req.headers()), None, "accepted {bad:?}");
        }
    }

    #[test]
    fn client_key_prefers_first_forwarded_hop() {
        let req = request_with(&[("x-forwarded-for", "41.13.2.9, 10.0.0.1")]);
        assert_eq!(client_key(&req), "41.13.2.9");
    }

    #[test]
    fn client_key_falls_back_to_peer_address() {
        let mut req = request_with(&[]);
        let peer: SocketAddr = "196.25.1.1:53000".parse().expect("addr");
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_key(&req), "196.25.1.1");
        assert_eq!(client_key(&request_with(&[])), "unknown");
    }

    #[tokio::test]
    async fn budget_is_tracked_per_client() {
        let limiter = ClientRateLimiter::per_minute(2);
        let t0 = Instant::now();

        assert!(limiter.check("a", t0).await.is_ok());
        assert!(limiter.check("a", t0).await.is_ok());
        assert!(limiter.check("a", t0).await.is_err());
        assert!(limiter.check("b", t0).await.is_ok());
    }

    #[tokio::test]
    async fn window_resets_after_it_elapses() {
        let limiter = ClientRateLimiter::new(1, Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(limiter.check("a", t0).await.is_ok());
        let retry = limiter
            .check("a", t0 + Duration::from_secs(4))
            .await
            .expect_err("budget spent");
        assert_eq!(retry, Duration::from_secs(6));
        assert!(limiter.check("a", t0 + Duration::from_secs(10)).await.is_ok());
    }

    #[tokio::test]
    async fn expired_clients_are_pruned() {
        let limiter = ClientRateLimiter::new(5, Duration::from_secs(10));
        let t0 = Instant::now();

        limiter.check("a", t0).await.expect("a");
        limiter.check("b", t0).await.expect("b");
        assert_eq!(limiter.tracked_clients().await, 2);

        limiter
            .check("c", t0 + Duration::from_secs(11))
            .await
            .expect("c");
        assert_eq!(limiter.tracked_clients().await, 1);
    }
}

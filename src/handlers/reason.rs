use axum::{Json, extract::{ConnectInfo, State}, http::HeaderMap};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::metrics::{RATE_LIMITED_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::state::AppState;

// Response format for /no
#[derive(Serialize)]
pub struct ReasonResponse {
    pub reason: String,
}

// Resolve the client identity: trusted proxy header first, else the
// connecting socket's IP
fn client_id(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| addr.ip().to_string())
}

pub async fn reason_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<ReasonResponse>, ApiError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let ip = client_id(&headers, addr);
    if !state.clients.allow(&ip) {
        RATE_LIMITED_TOTAL.inc();
        return Err(ApiError::RateLimited {
            limit: state.rate_limit,
        });
    }

    let reason = state.reasons.pick().to_string();
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(ReasonResponse { reason }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::ClientRegistry;
    use crate::reasons::ReasonStore;
    use std::time::Duration;

    fn test_state(requests_per_minute: u32, burst: u32) -> Arc<AppState> {
        Arc::new(AppState {
            reasons: ReasonStore::from_json(r#"["No.", "Still no."]"#).unwrap(),
            clients: Arc::new(ClientRegistry::new(
                requests_per_minute,
                burst,
                Duration::from_secs(180),
            )),
            rate_limit: requests_per_minute,
        })
    }

    fn addr(ip: &str) -> SocketAddr {
        format!("{}:51234", ip).parse().unwrap()
    }

    #[tokio::test]
    async fn serves_a_reason_from_the_list() {
        let state = test_state(120, 120);

        let Json(body) = reason_handler(
            State(state),
            ConnectInfo(addr("203.0.113.9")),
            HeaderMap::new(),
        )
        .await
        .unwrap();

        assert!(body.reason == "No." || body.reason == "Still no.");
    }

    #[tokio::test]
    async fn exhausted_client_is_rejected() {
        // zero refill, single token
        let state = test_state(0, 1);

        let first = reason_handler(
            State(state.clone()),
            ConnectInfo(addr("203.0.113.9")),
            HeaderMap::new(),
        )
        .await;
        assert!(first.is_ok());

        let second = reason_handler(
            State(state),
            ConnectInfo(addr("203.0.113.9")),
            HeaderMap::new(),
        )
        .await;
        assert!(matches!(second, Err(ApiError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn proxy_header_identifies_the_bucket() {
        let state = test_state(0, 1);

        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", "198.51.100.7".parse().unwrap());

        // two different socket addresses, same proxy header: one bucket
        let first = reason_handler(
            State(state.clone()),
            ConnectInfo(addr("203.0.113.9")),
            headers.clone(),
        )
        .await;
        assert!(first.is_ok());

        let second = reason_handler(
            State(state.clone()),
            ConnectInfo(addr("203.0.113.10")),
            headers,
        )
        .await;
        assert!(second.is_err());

        // without the header the socket address is its own fresh bucket
        let third = reason_handler(
            State(state),
            ConnectInfo(addr("203.0.113.9")),
            HeaderMap::new(),
        )
        .await;
        assert!(third.is_ok());
    }

    #[test]
    fn client_id_prefers_the_proxy_header() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", " 198.51.100.7 ".parse().unwrap());
        assert_eq!(client_id(&headers, addr("203.0.113.9")), "198.51.100.7");

        assert_eq!(client_id(&HeaderMap::new(), addr("203.0.113.9")), "203.0.113.9");
    }
}

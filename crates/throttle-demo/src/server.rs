//! HTTP server that answers with overload once requests arrive too fast.
//!
//! Routes:
//! - `GET /default`: `200` while the rate is within the ceiling, `503` above
//!   it, `500` when the ceiling is zero. The body is always `{}`.
//! - `GET /config?max=<f64>`: sets the ceiling in requests per second.

use crate::error::DemoError;
use crate::rate::{RateTracker, Verdict};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

/// Address the server listens on when none is given.
pub const DEFAULT_ADDR: &str = "127.0.0.1:23456";

impl Verdict {
    /// The HTTP status the server answers with.
    pub fn status(self) -> StatusCode {
        match self {
            Verdict::Accepted => StatusCode::OK,
            Verdict::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            Verdict::Unconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Builds the demo router around a shared tracker.
pub fn router(tracker: Arc<RateTracker>) -> Router {
    Router::new()
        .route("/default", get(default_handler))
        .route("/config", get(config_handler))
        .with_state(tracker)
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, DemoError> {
    TcpListener::bind(addr).await.map_err(DemoError::Bind)
}

/// Serves the router on `listener` until `shutdown` completes.
pub async fn serve<F>(
    listener: TcpListener,
    tracker: Arc<RateTracker>,
    shutdown: F,
) -> Result<(), DemoError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(tracker))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(DemoError::Serve)
}

async fn default_handler(State(tracker): State<Arc<RateTracker>>) -> impl IntoResponse {
    let verdict = tracker.admit(Instant::now());
    if verdict != Verdict::Accepted {
        tracing::info!(?verdict, rate = tracker.rate(), "rejecting request");
    }

    (
        verdict.status(),
        [(header::CONTENT_TYPE, "application/json")],
        "{}",
    )
}

#[derive(Debug, Deserialize)]
struct ConfigParams {
    max: Option<String>,
}

async fn config_handler(
    State(tracker): State<Arc<RateTracker>>,
    Query(params): Query<ConfigParams>,
) -> StatusCode {
    let Some(raw) = params.max else {
        tracing::warn!("missing max parameter");
        return StatusCode::BAD_REQUEST;
    };

    match parse_max_rate(&raw) {
        Some(rate) => {
            tracing::info!("Setting max request rate to: {:.2} requests per sec", rate);
            tracker.set_max_rate(rate);
            StatusCode::OK
        }
        None => {
            tracing::warn!(value = %raw, "invalid max rate");
            StatusCode::BAD_REQUEST
        }
    }
}

// Accepts finite, non-negative rates. Zero is a valid ceiling.
fn parse_max_rate(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite() && *rate >= 0.0)
}

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{error, info, warn};

/// Log one line per request with method, path, status and latency.
pub async fn trace_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        error!(%method, %path, status, latency_ms, "request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %path, status, latency_ms, "request rejected");
    } else {
        info!(%method, %path, status, latency_ms, "request handled");
    }

    response
}

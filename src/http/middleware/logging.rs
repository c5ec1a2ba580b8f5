//! Request logging.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::observability::metrics;
use crate::shield::BlockDecision;

/// Logs each completed request with its timing.
///
/// Requests the abuse filter blocked are counted but not logged; exploit
/// scans would otherwise drown the log.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), start);

    if response.extensions().get::<BlockDecision>().is_some() {
        return response;
    }

    let response_time = response
        .headers()
        .get("x-response-time")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        time = %response_time,
        "request"
    );

    response
}

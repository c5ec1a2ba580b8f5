//! Response timing headers.

use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

/// Measures request duration and exposes timing headers.
pub async fn timing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let mut response = next.run(request).await;

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    let rounded = (duration_ms * 10.0).round() / 10.0;

    if let Ok(value) = HeaderValue::from_str(&format!("{rounded}ms")) {
        response.headers_mut().insert("x-response-time", value);
    }
    // Useful for performance debugging in browser devtools.
    if let Ok(value) = HeaderValue::from_str(&format!("app;dur={rounded}")) {
        response.headers_mut().insert("server-timing", value);
    }

    response
}

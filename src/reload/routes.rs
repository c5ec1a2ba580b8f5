//! Routes for the live-reload subsystem.
//!
//! `/sse` is the subscription endpoint; `/updater.js` serves the client
//! snippet that opens the subscription and reloads the page on events.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{sse::KeepAlive, sse::Sse, IntoResponse, Response},
};

use crate::http::server::AppState;

/// Subscription endpoint path.
pub const SSE_PATH: &str = "/sse";

/// Reload client script path.
pub const UPDATER_PATH: &str = "/updater.js";

/// Reloads the page whenever the server broadcasts a `reload` event.
const UPDATER_SCRIPT: &str = "const sse = new EventSource('/sse'); sse.onopen = () => sse.addEventListener('reload', () => location.reload());";

/// Served outside dev mode so the script tag stays valid in production.
const NOOP_SCRIPT: &str = ";";

/// Handler for `GET /sse`.
///
/// Subscribing requires the client to declare it accepts an event stream;
/// anything else is refused with 415 and never enters the registry.
pub async fn subscribe(State(state): State<AppState>, request: Request) -> Response {
    if !accepts_event_stream(request.headers()) {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let (id, stream) = state.broadcaster.subscribe();
    tracing::info!(client = %client, id = %id, "reload client connected");

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

/// Handler for `GET /updater.js`.
pub async fn updater_script(State(state): State<AppState>) -> impl IntoResponse {
    let script = if state.config.dev { UPDATER_SCRIPT } else { NOOP_SCRIPT };
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        script,
    )
}

/// Whether the Accept header allows `text/event-stream`.
///
/// A missing header accepts everything, per content-negotiation defaults.
fn accepts_event_stream(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT) else {
        return true;
    };
    let Ok(accept) = accept.to_str() else {
        return false;
    };

    accept.split(',').any(|entry| {
        let media = entry.split(';').next().unwrap_or("").trim();
        media.eq_ignore_ascii_case("text/event-stream")
            || media == "*/*"
            || media.eq_ignore_ascii_case("text/*")
    })
}

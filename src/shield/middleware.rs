//! Abuse filter middleware.
//!
//! Short-circuits exploit-scanner probes (denylist, 404) and over-limit
//! clients (429) before any downstream step runs. Blocked requests are
//! marked with a [`BlockDecision`] on the response so the logging
//! middleware can skip them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::ShieldConfig;
use crate::observability::metrics;
use crate::shield::denylist;
use crate::shield::rate_limit::RateLimiter;

/// Identity used when a request cannot be attributed to any client.
/// Never rate limited.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Why a request was short-circuited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Denylist,
    RateLimit,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::Denylist => "denylist",
            BlockReason::RateLimit => "rate-limit",
        }
    }
}

/// Attached to short-circuited responses for downstream consumers.
#[derive(Debug, Clone, Copy)]
pub struct BlockDecision {
    pub reason: BlockReason,
}

/// State for the abuse filter.
pub struct ShieldState {
    limiter: RateLimiter,
    config: ShieldConfig,
}

impl ShieldState {
    pub fn new(config: ShieldConfig) -> Self {
        Self {
            limiter: RateLimiter::new(),
            config,
        }
    }
}

/// Middleware function for the abuse filter.
pub async fn shield_middleware(
    State(state): State<Arc<ShieldState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.enabled {
        return next.run(request).await;
    }

    let path = request.uri().path();

    if denylist::is_denylisted(path) {
        tracing::debug!(path = %path, "denylisted request blocked");
        metrics::record_blocked(BlockReason::Denylist.as_str());
        return blocked_response(StatusCode::NOT_FOUND, BlockReason::Denylist, None);
    }

    // Best-effort rate limiting; unattributable clients are never penalized.
    let identity = client_identity(&request);
    if identity != UNKNOWN_IDENTITY
        && state.limiter.check(
            &identity,
            state.config.rate_limit,
            Duration::from_secs(state.config.window_secs),
        )
    {
        tracing::warn!(client = %identity, "rate limit exceeded");
        metrics::record_blocked(BlockReason::RateLimit.as_str());
        return blocked_response(
            StatusCode::TOO_MANY_REQUESTS,
            BlockReason::RateLimit,
            Some(state.config.window_secs),
        );
    }

    next.run(request).await
}

/// Extract the client identity for rate limiting.
///
/// Order: first entry of `x-forwarded-for` (hosting platforms set it),
/// then the connection's peer IP, then [`UNKNOWN_IDENTITY`].
fn client_identity(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string())
}

fn blocked_response(
    status: StatusCode,
    reason: BlockReason,
    retry_after_secs: Option<u64>,
) -> Response {
    let mut response = match reason {
        BlockReason::Denylist => status.into_response(),
        BlockReason::RateLimit => {
            let mut response = Response::new(Body::from("Too Many Requests"));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            response
        }
    };

    if let Some(secs) = retry_after_secs {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    }

    response.extensions_mut().insert(BlockDecision { reason });
    response
}

//! HTTP server setup and pipeline composition.
//!
//! # Responsibilities
//! - Construct the stateful subsystems (shield, broadcaster, vendor cache)
//!   and inject them into the pipeline
//! - Wire the middleware chain in its fixed order
//! - Mount the reload routes and the static file fallback
//! - Run the server with graceful shutdown
//! - Start the reload watcher in dev mode

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::middleware::{
    logging_middleware, security_headers_middleware, timing_middleware,
};
use crate::reload::routes as reload_routes;
use crate::reload::{ReloadBroadcaster, ReloadWatcher};
use crate::shield::{shield_middleware, ShieldState};
use crate::vendor::{vendor_middleware, VendorService};

/// Application state injected into route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub broadcaster: ReloadBroadcaster,
}

/// The composed server.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    broadcaster: ReloadBroadcaster,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let config = Arc::new(config);
        let broadcaster = ReloadBroadcaster::new();
        let shield = Arc::new(ShieldState::new(config.shield.clone()));
        let vendor = Arc::new(VendorService::from_config(&config.vendor));

        let state = AppState {
            config: Arc::clone(&config),
            broadcaster: broadcaster.clone(),
        };
        let router = Self::build_router(&config, state, shield, vendor);

        Self {
            router,
            config,
            broadcaster,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost-first in the order logging → timing → security
    /// headers → shield → vendor → routes/static. The shield must sit
    /// outside the vendor proxy so blocked probes never trigger fetches.
    fn build_router(
        config: &ServerConfig,
        state: AppState,
        shield: Arc<ShieldState>,
        vendor: Arc<VendorService>,
    ) -> Router {
        let config_for_headers = Arc::clone(&state.config);

        Router::new()
            .route(reload_routes::UPDATER_PATH, get(reload_routes::updater_script))
            .route(reload_routes::SSE_PATH, get(reload_routes::subscribe))
            .fallback_service(ServeDir::new(&config.static_dir))
            .with_state(state)
            .layer(from_fn_with_state(vendor, vendor_middleware))
            .layer(from_fn_with_state(shield, shield_middleware))
            .layer(from_fn_with_state(config_for_headers, security_headers_middleware))
            .layer(from_fn(timing_middleware))
            .layer(from_fn(logging_middleware))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, dev = self.config.dev, "HTTP server starting");

        // The watcher handle must outlive the serve loop or notifications stop.
        let mut _watcher = None;
        if self.config.dev {
            let watcher = ReloadWatcher::new(
                Path::new(&self.config.static_dir),
                self.broadcaster.clone(),
            );
            match watcher.run() {
                Ok(w) => _watcher = Some(w),
                Err(e) => tracing::error!(error = %e, "failed to start reload watcher"),
            }
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The reload broadcaster, for collaborators outside the router.
    pub fn broadcaster(&self) -> ReloadBroadcaster {
        self.broadcaster.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

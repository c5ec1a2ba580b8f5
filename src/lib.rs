//! Static site dev server library.
//!
//! Three stateful subsystems around an Axum pipeline: an abuse filter with
//! fixed-window rate limiting (`shield`), an SSE live-reload broadcaster fed
//! by a filesystem watcher (`reload`), and a write-through proxy cache for
//! allow-listed CDN assets (`vendor`).

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod shield;
pub mod vendor;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

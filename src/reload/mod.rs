//! Live-reload subsystem.
//!
//! # Data Flow
//! ```text
//! client GET /sse (Accept: text/event-stream)
//!     → routes.rs (negotiate, open channel)
//!     → broadcaster.rs (registry of open channels)
//!
//! static file change
//!     → watcher.rs (notify callback → mpsc → task)
//!     → broadcaster.send("reload", details)
//!     → broadcaster.close_all()
//! ```
//!
//! # Design Decisions
//! - Channels are keyed by connection id, not IP, so multiple tabs from one
//!   machine each get their own channel
//! - Broadcast-then-close-all is intentional: every subscriber is about to
//!   reconnect from its reloaded page
//! - Registry mutation is snapshot-then-iterate; a subscription racing a
//!   broadcast may miss it but cannot corrupt the registry

pub mod broadcaster;
pub mod routes;
pub mod watcher;

pub use broadcaster::ReloadBroadcaster;
pub use watcher::ReloadWatcher;

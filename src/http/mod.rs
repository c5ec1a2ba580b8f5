//! HTTP pipeline composition.
//!
//! # Data Flow
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!  request ───────▶│ logging → timing → security headers → shield │
//!                  │     → vendor → reload routes / static files  │
//!  response ◀──────│ (each step may short-circuit the rest)       │
//!                  └──────────────────────────────────────────────┘
//! ```

pub mod middleware;
pub mod server;

pub use server::{AppState, HttpServer};

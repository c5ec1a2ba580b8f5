//! Abuse filtering subsystem.
//!
//! # Data Flow
//! ```text
//! request
//!     → denylist.rs (pure path classification)
//!         match → 404, chain terminated
//!     → rate_limit.rs (fixed-window counter per client identity)
//!         over limit → 429 + Retry-After, chain terminated
//!     → downstream middleware
//! ```
//!
//! # Design Decisions
//! - Denylist runs first; blocked probes never touch the rate table
//! - Unattributable clients ("unknown") are never rate limited
//! - Blocked responses carry a BlockDecision so logging can skip them

pub mod denylist;
pub mod middleware;
pub mod rate_limit;

pub use middleware::{shield_middleware, BlockDecision, BlockReason, ShieldState};
pub use rate_limit::RateLimiter;

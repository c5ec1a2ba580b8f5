//! Observability: structured logging via `tracing` (initialized in `main`)
//! and metrics via the `metrics` facade with a Prometheus exporter.

pub mod metrics;

//! # neohub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Collect reconciliation gauges through the `MetricsSink` port and serve
//!   them at `/metrics` in Prometheus text format
//! - Serve a read-only JSON view of the latest hub snapshot under `/api`
//!   (`/api/hub`, `/api/zones`, `/api/plugs`, `/api/profiles`)
//! - Answer `/health` for liveness probes
//!
//! ## Dependency rule
//! Depends on `neohub-app` (for the metrics port) and `neohub-domain` (for
//! the snapshot and its projections). Never leaks axum types into the
//! domain. Handlers only read the snapshot; they never talk to the hub.

pub mod api;
pub mod config;
pub mod error;
pub mod gauges;
pub mod router;
pub mod state;

pub use config::HttpConfig;
pub use gauges::GaugeRegistry;
pub use state::AppState;

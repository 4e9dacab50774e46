//! # neohub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `HubChannel`: single-flight command/response access to a hub
//!   - `AddressStore`: persistence of the discovered hub identity
//!   - `MetricsSink`: optional gauge reporting
//!   - `EventPublisher`: session event notifications
//! - Define **driving/inbound use-cases**:
//!   - `Reconciler`: timestamp-gated refresh of the hub state
//!   - `HubService`: hub-scoped commands
//!   - `DeviceService`: zone and plug commands
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* the hub is reached
//!
//! ## Dependency rule
//! Depends on `neohub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod metrics;
pub mod ports;
pub mod reconcile;
pub mod services;

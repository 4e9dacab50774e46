//! # neohub-adapter-tcp
//!
//! Network adapter for the hub.
//!
//! ## Responsibilities
//! - Find the hub on the local network with a UDP broadcast probe
//! - Own the TCP connection to the hub command port
//! - Frame commands as delimited JSON, one in flight at a time, with a
//!   periodic keep-alive
//! - Run the long-lived [`HubClient`] session: connect, reconcile, poll and
//!   reconnect
//!
//! ## Dependency rule
//! Depends on `neohub-domain` and `neohub-app`. [`Protocol`] implements the
//! `HubChannel` port; [`HubClient`] drives the `Reconciler` use-case and
//! takes any `AddressStore`.

pub mod client;
pub mod config;
pub mod discovery;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::HubClient;
pub use config::{ClientConfig, ConnectionConfig, DiscoveryConfig};
pub use protocol::Protocol;
pub use transport::Transport;

//! Session events: notifications about the hub connection lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::identity::HubIdentity;

/// Something that happened to the hub session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Discovery resolved a hub.
    HubDiscovered { hub: HubIdentity },
    /// The connection is up and the initial reconciliation finished.
    Connected { hub: HubIdentity },
    /// The connection was torn down.
    Disconnected { hub: HubIdentity, reason: String },
    /// A reconciliation cycle completed and a new snapshot was published.
    NetworkUpdated {
        hub_id: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Short name of the event, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::HubDiscovered { .. } => "hub_discovered",
            Self::Connected { .. } => "connected",
            Self::Disconnected { .. } => "disconnected",
            Self::NetworkUpdated { .. } => "network_updated",
        }
    }
}

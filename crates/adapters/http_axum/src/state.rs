//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use neohub_domain::identity::ConnectionState;
use neohub_domain::state::HubState;

use crate::error::ApiError;
use crate::gauges::GaugeRegistry;

/// Application state shared across all axum handlers.
///
/// Holds receivers on the client's snapshot and connection channels, so
/// handlers always see the latest completed cycle without locking.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: watch::Receiver<Option<Arc<HubState>>>,
    pub connection: watch::Receiver<ConnectionState>,
    pub gauges: Arc<GaugeRegistry>,
}

impl AppState {
    pub fn new(
        snapshot: watch::Receiver<Option<Arc<HubState>>>,
        connection: watch::Receiver<ConnectionState>,
        gauges: Arc<GaugeRegistry>,
    ) -> Self {
        Self {
            snapshot,
            connection,
            gauges,
        }
    }

    /// Latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unavailable`] until the first cycle completes.
    pub fn current(&self) -> Result<Arc<HubState>, ApiError> {
        self.snapshot.borrow().clone().ok_or(ApiError::Unavailable)
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }
}

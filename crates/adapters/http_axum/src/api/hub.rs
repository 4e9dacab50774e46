//! Hub overview.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use neohub_domain::identity::ConnectionState;
use neohub_domain::summary::HubSummary;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HubResponse {
    pub connection: ConnectionState,
    #[serde(flatten)]
    pub summary: HubSummary,
}

/// `GET /api/hub`
///
/// # Errors
///
/// [`ApiError::Unavailable`] before the first snapshot.
pub async fn get(State(state): State<AppState>) -> Result<Json<HubResponse>, ApiError> {
    let snapshot = state.current()?;
    Ok(Json(HubResponse {
        connection: state.connection_state(),
        summary: HubSummary::from(snapshot.as_ref()),
    }))
}

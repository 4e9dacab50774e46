//! Named profile views.

use axum::Json;
use axum::extract::{Path, State};

use neohub_domain::summary::ProfileSummary;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/profiles`
///
/// # Errors
///
/// [`ApiError::Unavailable`] before the first snapshot.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProfileSummary>>, ApiError> {
    let snapshot = state.current()?;
    Ok(Json(
        snapshot.profiles.values().map(ProfileSummary::from).collect(),
    ))
}

/// `GET /api/profiles/{name}`
///
/// # Errors
///
/// [`ApiError::Unavailable`] before the first snapshot, [`ApiError::NotFound`]
/// for an unknown profile.
pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProfileSummary>, ApiError> {
    let snapshot = state.current()?;
    snapshot
        .profiles
        .get(&name)
        .map(|profile| Json(ProfileSummary::from(profile)))
        .ok_or(ApiError::NotFound {
            kind: "profile",
            name,
        })
}

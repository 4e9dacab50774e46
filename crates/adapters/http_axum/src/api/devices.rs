//! Zone and plug views.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};

use neohub_domain::device::Device;
use neohub_domain::summary::{DeviceDetail, DeviceSummary};

use crate::error::ApiError;
use crate::state::AppState;

fn summaries(devices: &BTreeMap<String, Device>) -> Vec<DeviceSummary> {
    devices.values().map(DeviceSummary::from).collect()
}

fn detail(
    devices: &BTreeMap<String, Device>,
    kind: &'static str,
    name: String,
) -> Result<DeviceDetail, ApiError> {
    devices
        .get(&name)
        .map(DeviceDetail::from)
        .ok_or(ApiError::NotFound { kind, name })
}

/// `GET /api/zones`
///
/// # Errors
///
/// [`ApiError::Unavailable`] before the first snapshot.
pub async fn list_zones(State(state): State<AppState>) -> Result<Json<Vec<DeviceSummary>>, ApiError> {
    Ok(Json(summaries(&state.current()?.zones)))
}

/// `GET /api/zones/{name}`
///
/// # Errors
///
/// [`ApiError::Unavailable`] before the first snapshot, [`ApiError::NotFound`]
/// for an unknown zone.
pub async fn get_zone(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeviceDetail>, ApiError> {
    detail(&state.current()?.zones, "zone", name).map(Json)
}

/// `GET /api/plugs`
///
/// # Errors
///
/// [`ApiError::Unavailable`] before the first snapshot.
pub async fn list_plugs(State(state): State<AppState>) -> Result<Json<Vec<DeviceSummary>>, ApiError> {
    Ok(Json(summaries(&state.current()?.plugs)))
}

/// `GET /api/plugs/{name}`
///
/// # Errors
///
/// [`ApiError::Unavailable`] before the first snapshot, [`ApiError::NotFound`]
/// for an unknown plug.
pub async fn get_plug(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeviceDetail>, ApiError> {
    detail(&state.current()?.plugs, "plug", name).map(Json)
}

//! JSON API handler modules.

pub mod devices;
pub mod hub;
pub mod profiles;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hub", get(hub::get))
        .route("/zones", get(devices::list_zones))
        .route("/zones/{name}", get(devices::get_zone))
        .route("/plugs", get(devices::list_plugs))
        .route("/plugs/{name}", get(devices::get_plug))
        .route("/profiles", get(profiles::list))
        .route("/profiles/{name}", get(profiles::get))
}

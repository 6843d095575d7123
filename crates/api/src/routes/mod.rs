pub mod device;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /devices                                          list, create
/// /devices/search                                   search (?query, name, perpage, page)
/// /devices/{id}                                     get, update, delete
/// /devices/serial-number/{serial}                   lookup by serial number
/// /devices/serial-number/{serial}/code/{code}       lookup by serial + activation code
/// /devices/{id}/last-reading                        latest sensor values
/// /devices/{id}/sensors/{sensor_type}               sensor series
/// /devices/{id}/sensors/{sensor_type}/threshold     effective threshold
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/devices", device::router())
}

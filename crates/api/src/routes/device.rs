//! Route definitions for devices, mounted at `/devices`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{device, device_metrics};
use crate::state::AppState;

/// Device routes.
///
/// ```text
/// GET    /                                        -> list_devices
/// POST   /                                        -> create_device
/// GET    /search                                  -> search_devices
/// GET    /serial-number/{serial}                  -> get_device_by_serial
/// GET    /serial-number/{serial}/code/{code}      -> get_device_by_serial_and_code
/// GET    /{id}                                    -> get_device
/// PUT    /{id}                                    -> update_device
/// DELETE /{id}                                    -> delete_device
/// GET    /{id}/last-reading                       -> get_last_reading
/// GET    /{id}/sensors/{sensor_type}              -> get_sensor_data
/// GET    /{id}/sensors/{sensor_type}/threshold    -> get_sensor_threshold
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(device::list_devices).post(device::create_device))
        .route("/search", get(device::search_devices))
        .route(
            "/serial-number/{serial}",
            get(device::get_device_by_serial),
        )
        .route(
            "/serial-number/{serial}/code/{code}",
            get(device::get_device_by_serial_and_code),
        )
        .route(
            "/{id}",
            get(device::get_device)
                .put(device::update_device)
                .delete(device::delete_device),
        )
        .route("/{id}/last-reading", get(device_metrics::get_last_reading))
        .route(
            "/{id}/sensors/{sensor_type}",
            get(device_metrics::get_sensor_data),
        )
        .route(
            "/{id}/sensors/{sensor_type}/threshold",
            get(device::get_sensor_threshold),
        )
}

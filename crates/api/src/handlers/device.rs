//! Handlers for device CRUD, lookup and search.
//!
//! Every query is scoped to the caller's organisation. Update and delete
//! require the admin role; creation requires editor or admin.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sensordash_core::metrics::validate_sensor_type;
use sensordash_core::search::Pagination;
use sensordash_core::types::DbId;
use sensordash_db::models::device::{CreateDevice, DeviceSearch, UpdateDevice};
use sensordash_db::repositories::{DeviceRepo, ThresholdRepo};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireDeviceAdmin, RequireEditor};
use crate::query::DeviceSearchParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/devices
///
/// All devices of the caller's organisation, ordered by name.
pub async fn list_devices(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let devices = DeviceRepo::list_by_org(&state.pool, user.org_id).await?;
    Ok(Json(DataResponse { data: devices }))
}

/// POST /api/devices
pub async fn create_device(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateDevice>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let device = DeviceRepo::create(&state.pool, user.org_id, Some(user.user_id), &input).await?;

    tracing::info!(
        device_id = device.id,
        org_id = device.org_id,
        name = %device.name,
        user_id = user.user_id,
        "Device created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: device })))
}

/// GET /api/devices/search?query=&name=&perpage=&page=
///
/// `perpage <= 0` falls back to 1000 rows, `page < 1` to the first page.
/// With `EDITORS_CAN_ADMIN` set, non-admins only see devices they created.
pub async fn search_devices(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DeviceSearchParams>,
) -> AppResult<impl IntoResponse> {
    let pagination = Pagination::from_params(params.page, params.perpage);

    let owner_id = (state.config.editors_can_admin && !user.is_admin()).then_some(user.user_id);

    let search = DeviceSearch {
        org_id: user.org_id,
        query: params.query.filter(|q| !q.is_empty()),
        name: params.name.filter(|n| !n.is_empty()),
        owner_id,
        limit: pagination.per_page,
        page: pagination.page,
    };

    let result = DeviceRepo::search(&state.pool, &search).await?;
    Ok(Json(DataResponse { data: result }))
}

/// GET /api/devices/{id}
pub async fn get_device(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let device = DeviceRepo::find_by_id(&state.pool, user.org_id, id).await?;
    Ok(Json(DataResponse { data: device }))
}

/// GET /api/devices/serial-number/{serial}
pub async fn get_device_by_serial(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(serial): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let device = DeviceRepo::find_by_serial(&state.pool, user.org_id, &serial, None).await?;
    Ok(Json(DataResponse { data: device }))
}

/// GET /api/devices/serial-number/{serial}/code/{code}
///
/// Like [`get_device_by_serial`] but the activation code must match too.
pub async fn get_device_by_serial_and_code(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath((serial, code)): ApiPath<(String, i32)>,
) -> AppResult<impl IntoResponse> {
    let device = DeviceRepo::find_by_serial(&state.pool, user.org_id, &serial, Some(code)).await?;
    Ok(Json(DataResponse { data: device }))
}

/// PUT /api/devices/{id}
pub async fn update_device(
    RequireDeviceAdmin(admin): RequireDeviceAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateDevice>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    DeviceRepo::update(&state.pool, admin.org_id, id, &input).await?;

    tracing::info!(device_id = id, user_id = admin.user_id, "Device updated");

    Ok(Json(MessageResponse {
        message: "Device updated",
    }))
}

/// DELETE /api/devices/{id}
pub async fn delete_device(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    DeviceRepo::delete(&state.pool, admin.org_id, id).await?;

    tracing::info!(device_id = id, user_id = admin.user_id, "Device deleted");

    Ok(Json(MessageResponse {
        message: "Device deleted",
    }))
}

/// GET /api/devices/{id}/sensors/{sensor_type}/threshold
///
/// The device-specific threshold if one exists, else the organisation default.
pub async fn get_sensor_threshold(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath((id, sensor_type)): ApiPath<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    validate_sensor_type(&sensor_type)?;

    let threshold = ThresholdRepo::resolve(&state.pool, user.org_id, id, &sensor_type).await?;
    Ok(Json(DataResponse { data: threshold }))
}

//! Handlers proxying per-device metric queries to the metrics backend.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use sensordash_core::metrics::{
    last_reading_query, validate_sensor_type, SensorSeriesQuery, Series, DEFAULT_SERIES_DURATION,
};
use sensordash_core::types::DbId;
use sensordash_db::repositories::DeviceRepo;

use crate::error::AppResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::middleware::rbac::RequireAuth;
use crate::query::SensorDataParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/devices/{id}/last-reading
///
/// Most recent value of every sensor on the device over the past hour.
pub async fn get_last_reading(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    DeviceRepo::find_by_id(&state.pool, user.org_id, id).await?;

    let bucket = state.metrics.config().bucket.clone();
    let flux = last_reading_query(&bucket, id);

    tracing::debug!(device_id = id, %bucket, "Querying last reading");

    let readings = state.metrics.query(&bucket, flux).await?;
    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/devices/{id}/sensors/{sensor_type}?bucket_suffix=&duration=&every=&series=
pub async fn get_sensor_data(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath((id, sensor_type)): ApiPath<(DbId, String)>,
    ApiQuery(params): ApiQuery<SensorDataParams>,
) -> AppResult<impl IntoResponse> {
    validate_sensor_type(&sensor_type)?;

    let query = SensorSeriesQuery {
        device_id: id,
        sensor_type,
        bucket_suffix: params.bucket_suffix.unwrap_or_default(),
        duration: params
            .duration
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_SERIES_DURATION.to_string()),
        every: params.every.filter(|e| !e.is_empty()),
        series: Series::from_param(params.series.as_deref()),
    };
    query.validate()?;

    DeviceRepo::find_by_id(&state.pool, user.org_id, id).await?;

    let bucket = query.bucket(&state.metrics.config().bucket);
    let flux = query.to_flux(&state.metrics.config().bucket);

    tracing::debug!(
        device_id = id,
        sensor_type = %query.sensor_type,
        %bucket,
        "Querying sensor series",
    );

    let series = state.metrics.query(&bucket, flux).await?;
    Ok(Json(DataResponse { data: series }))
}

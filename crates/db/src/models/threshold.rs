//! Sensor threshold read model.

use serde::Serialize;
use sensordash_core::types::DbId;
use sqlx::FromRow;

/// The threshold in effect for one device and sensor type.
///
/// For an organisation default, `device_id` is the device that was asked
/// about rather than `NULL`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdDto {
    pub id: DbId,
    pub org_id: DbId,
    pub device_id: DbId,
    pub sensor_type: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: i16,
    pub data: serde_json::Value,
    #[serde(skip)]
    pub is_default: bool,
}

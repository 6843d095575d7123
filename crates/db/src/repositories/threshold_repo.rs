//! Repository for the `threshold` table.

use sensordash_core::device::DeviceError;
use sensordash_core::types::DbId;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::threshold::ThresholdDto;

/// Read access to sensor thresholds.
pub struct ThresholdRepo;

impl ThresholdRepo {
    /// Resolve the threshold in effect for a device and sensor type.
    ///
    /// A device-specific override wins over the organisation default; the
    /// `priority` column makes that ordering explicit instead of relying on
    /// `UNION` output order.
    pub async fn resolve(
        pool: &PgPool,
        org_id: DbId,
        device_id: DbId,
        sensor_type: &str,
    ) -> Result<ThresholdDto, StoreError> {
        let threshold = sqlx::query_as::<_, ThresholdDto>(
            "SELECT id, org_id, device_id, sensor_type, type, data, is_default \
             FROM ( \
                 SELECT t.id, t.org_id, t.device_id, t.measurement AS sensor_type, \
                        t.type, t.data, t.is_default, 0 AS priority \
                 FROM threshold t \
                 WHERE t.org_id = $1 AND t.device_id = $2 AND t.measurement = $3 \
                   AND NOT t.is_default \
                 UNION ALL \
                 SELECT t.id, t.org_id, $2::BIGINT AS device_id, t.measurement AS sensor_type, \
                        t.type, t.data, t.is_default, 1 AS priority \
                 FROM threshold t \
                 WHERE t.org_id = $1 AND t.measurement = $3 AND t.is_default \
             ) candidates \
             ORDER BY priority, id \
             LIMIT 1",
        )
        .bind(org_id)
        .bind(device_id)
        .bind(sensor_type)
        .fetch_optional(pool)
        .await?
        .ok_or(DeviceError::ThresholdNotFound)?;

        Ok(threshold)
    }
}

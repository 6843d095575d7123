//! Flux query construction for the per-device metric endpoints.
//!
//! Every caller-supplied fragment is checked against a strict pattern
//! before it is interpolated into the query text.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::DbId;

/// Range used by the last-reading query.
pub const LAST_READING_RANGE: &str = "-1h";

/// Range used by the sensor series query when no `duration` is given.
pub const DEFAULT_SERIES_DURATION: &str = "1h";

/// Sampling interval hint sent with every metric request, in milliseconds.
pub const QUERY_INTERVAL_MS: i64 = 20_000;

static SENSOR_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{1,64}$").expect("valid regex"));

static BUCKET_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]{0,64}$").expect("valid regex"));

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,6}(ns|us|ms|mo|s|m|h|d|w|y)){1,4}$").expect("valid regex")
});

/// Which field of a sensor measurement to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Value,
    Min,
    Max,
}

impl Series {
    /// `min` and `max` select those fields; anything else reads `value`.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("min") => Series::Min,
            Some("max") => Series::Max,
            _ => Series::Value,
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            Series::Value => "value",
            Series::Min => "min",
            Series::Max => "max",
        }
    }
}

pub fn validate_sensor_type(sensor_type: &str) -> Result<(), CoreError> {
    if SENSOR_TYPE_RE.is_match(sensor_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid sensor type '{sensor_type}'"
        )))
    }
}

pub fn validate_bucket_suffix(suffix: &str) -> Result<(), CoreError> {
    if BUCKET_SUFFIX_RE.is_match(suffix) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid bucket suffix '{suffix}'"
        )))
    }
}

/// Validate a Flux duration literal such as `30m`, `7d` or `1h30m`.
pub fn validate_duration(field: &str, duration: &str) -> Result<(), CoreError> {
    if DURATION_RE.is_match(duration) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {field} '{duration}': expected a duration like 30m, 6h or 7d"
        )))
    }
}

/// Flux query returning the most recent `value` of any sensor on a device.
pub fn last_reading_query(bucket: &str, device_id: DbId) -> String {
    format!(
        "from(bucket: \"{bucket}\") \
         |> range(start: {LAST_READING_RANGE}) \
         |> filter(fn: (r) => r._field == \"value\" and r.device_id == \"{device_id}\") \
         |> last()"
    )
}

/// Parameters of a ranged sensor series query.
#[derive(Debug, Clone)]
pub struct SensorSeriesQuery {
    pub device_id: DbId,
    pub sensor_type: String,
    pub bucket_suffix: String,
    pub duration: String,
    pub every: Option<String>,
    pub series: Series,
}

impl SensorSeriesQuery {
    /// Check every interpolated fragment.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_sensor_type(&self.sensor_type)?;
        validate_bucket_suffix(&self.bucket_suffix)?;
        validate_duration("duration", &self.duration)?;
        if let Some(every) = &self.every {
            validate_duration("every", every)?;
        }
        Ok(())
    }

    /// The bucket this query reads: the base bucket plus the suffix.
    pub fn bucket(&self, base_bucket: &str) -> String {
        format!("{base_bucket}{}", self.bucket_suffix)
    }

    /// Render the Flux query. Call [`SensorSeriesQuery::validate`] first.
    pub fn to_flux(&self, base_bucket: &str) -> String {
        let aggregate = match &self.every {
            Some(every) => format!(" |> aggregateWindow(every: {every}, fn: mean)"),
            None => String::new(),
        };
        format!(
            "from(bucket: \"{bucket}\") \
             |> range(start: -{duration}) \
             |> filter(fn: (r) => r._field == \"{field}\" and r.device_id == \"{device_id}\" \
             and r._measurement == \"{sensor_type}\"){aggregate}",
            bucket = self.bucket(base_bucket),
            duration = self.duration,
            field = self.series.field(),
            device_id = self.device_id,
            sensor_type = self.sensor_type,
        )
    }
}

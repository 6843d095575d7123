//! Query parameter types for the device endpoints.

use serde::{Deserialize, Deserializer};

/// `GET /api/devices/search?query=&name=&perpage=&page=`
#[derive(Debug, Default, Deserialize)]
pub struct DeviceSearchParams {
    /// Substring to match against device names.
    pub query: Option<String>,
    /// Exact device name.
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub perpage: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
}

/// `GET /api/devices/{id}/sensors/{sensor_type}?bucket_suffix=&duration=&every=&series=`
#[derive(Debug, Default, Deserialize)]
pub struct SensorDataParams {
    pub bucket_suffix: Option<String>,
    /// Look-back window, e.g. `24h`.
    pub duration: Option<String>,
    /// Aggregation window, e.g. `1h`; no aggregation when absent.
    pub every: Option<String>,
    /// `min`, `max`, or anything else for `value`.
    pub series: Option<String>,
}

/// Parse an integer parameter, treating empty or non-numeric input as absent
/// so the caller's defaults apply.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

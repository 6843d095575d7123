//! Device rows, read projections, and write/search inputs.
//!
//! Wire format is camelCase to match the dashboard frontend.

use serde::{Deserialize, Serialize};
use sensordash_core::device::{validate_location_text, validate_name, validate_serial_number};
use sensordash_core::error::CoreError;
use sensordash_core::geo::{GeoPoint, WkbError};
use sensordash_core::types::{DbId, Timestamp};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A raw row from the `device` table, geometry still encoded.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceRow {
    pub id: DbId,
    pub org_id: DbId,
    pub serial_number: String,
    pub name: String,
    pub location_gps: Option<Vec<u8>>,
    pub location_text: Option<String>,
    pub floor: Option<String>,
    pub activation_code: Option<i32>,
    pub created_by: Option<DbId>,
    pub created: Timestamp,
    pub updated: Timestamp,
}

/// A persisted device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DbId,
    pub org_id: DbId,
    pub serial_number: String,
    pub name: String,
    pub location_gps: Option<GeoPoint>,
    pub location_text: Option<String>,
    pub floor: Option<String>,
    #[serde(skip_serializing)]
    pub activation_code: Option<i32>,
    pub created_by: Option<DbId>,
    pub created: Timestamp,
    pub updated: Timestamp,
}

impl TryFrom<DeviceRow> for Device {
    type Error = WkbError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let location_gps = row
            .location_gps
            .as_deref()
            .map(GeoPoint::from_ewkb)
            .transpose()?;

        Ok(Device {
            id: row.id,
            org_id: row.org_id,
            serial_number: row.serial_number,
            name: row.name,
            location_gps,
            location_text: row.location_text,
            floor: row.floor,
            activation_code: row.activation_code,
            created_by: row.created_by,
            created: row.created,
            updated: row.updated,
        })
    }
}

/// Read-only projection returned by the lookup and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDto {
    pub id: DbId,
    pub org_id: DbId,
    pub serial_number: String,
    pub name: String,
    pub location_gps: Option<GeoPoint>,
    pub location_text: Option<String>,
    pub floor: Option<String>,
}

impl From<Device> for DeviceDto {
    fn from(device: Device) -> Self {
        DeviceDto {
            id: device.id,
            org_id: device.org_id,
            serial_number: device.serial_number,
            name: device.name,
            location_gps: device.location_gps,
            location_text: device.location_text,
            floor: device.floor,
        }
    }
}

impl TryFrom<DeviceRow> for DeviceDto {
    type Error = WkbError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        Device::try_from(row).map(DeviceDto::from)
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for registering a device. The organisation comes from the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDevice {
    pub name: String,
    #[serde(default)]
    pub serial_number: String,
    pub location_gps: Option<GeoPoint>,
    pub location_text: Option<String>,
    pub floor: Option<String>,
    pub activation_code: Option<i32>,
}

/// DTO for replacing a device's mutable fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDevice {
    pub name: String,
    #[serde(default)]
    pub serial_number: String,
    pub location_gps: Option<GeoPoint>,
    pub location_text: Option<String>,
    pub floor: Option<String>,
    pub activation_code: Option<i32>,
}

impl CreateDevice {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_fields(
            &self.name,
            &self.serial_number,
            self.location_gps.as_ref(),
            self.location_text.as_deref(),
            self.floor.as_deref(),
        )
    }
}

impl UpdateDevice {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_fields(
            &self.name,
            &self.serial_number,
            self.location_gps.as_ref(),
            self.location_text.as_deref(),
            self.floor.as_deref(),
        )
    }
}

fn validate_fields(
    name: &str,
    serial_number: &str,
    location_gps: Option<&GeoPoint>,
    location_text: Option<&str>,
    floor: Option<&str>,
) -> Result<(), CoreError> {
    validate_name(name)?;
    validate_serial_number(serial_number)?;
    validate_location_text("locationText", location_text)?;
    validate_location_text("floor", floor)?;
    if let Some(point) = location_gps {
        if !point.is_valid() {
            return Err(CoreError::Validation(format!(
                "locationGps out of range: latitude {}, longitude {}",
                point.latitude, point.longitude
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Filters and pagination for a device search within one organisation.
#[derive(Debug, Clone, Default)]
pub struct DeviceSearch {
    pub org_id: DbId,
    /// Substring of the name (`ILIKE '%query%'`).
    pub query: Option<String>,
    /// Exact name.
    pub name: Option<String>,
    /// Restrict to devices created by this user.
    pub owner_id: Option<DbId>,
    /// Page size; `0` disables pagination.
    pub limit: i64,
    /// 1-based page number.
    pub page: i64,
}

/// One page of search results plus the unpaginated match count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSearchResult {
    pub total_count: i64,
    pub devices: Vec<DeviceDto>,
    pub page: i64,
    pub per_page: i64,
}

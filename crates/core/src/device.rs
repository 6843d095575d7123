//! Device domain rules: sentinel errors and input validation.

use crate::error::CoreError;

/// Maximum length of a device name or serial number, in characters.
pub const MAX_NAME_LENGTH: usize = 190;

/// Maximum length of the free-text location and floor label.
pub const MAX_LOCATION_TEXT_LENGTH: usize = 255;

/// Sentinel outcomes of device operations.
///
/// The HTTP layer matches on these to choose a status code, so each variant
/// has exactly one meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not found")]
    NotFound,

    #[error("Device name is taken")]
    NameTaken,

    #[error("Threshold not found")]
    ThresholdNotFound,

    #[error("User not allowed to update device")]
    NotAllowedToUpdate,
}

/// Validate a device name: required, trimmed non-empty, bounded length.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Device name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Device name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a serial number. Empty is allowed; uniqueness is not enforced.
pub fn validate_serial_number(serial_number: &str) -> Result<(), CoreError> {
    if serial_number.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Serial number exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the optional free-text fields (`location_text`, `floor`).
pub fn validate_location_text(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > MAX_LOCATION_TEXT_LENGTH => Err(CoreError::Validation(
            format!("{field} exceeds maximum length of {MAX_LOCATION_TEXT_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

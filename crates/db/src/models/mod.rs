//! Row structs and request/response DTOs.

pub mod device;
pub mod threshold;

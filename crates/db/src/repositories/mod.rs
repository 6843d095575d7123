//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async functions that
//! accept `&PgPool` as the first argument.

pub mod device_repo;
pub mod threshold_repo;

pub use device_repo::DeviceRepo;
pub use threshold_repo::ThresholdRepo;

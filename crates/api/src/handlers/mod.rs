pub mod device;
pub mod device_metrics;

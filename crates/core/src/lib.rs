//! Domain types and pure helpers for the device registry.
//!
//! Nothing in this crate performs I/O, so it is shared by the repository
//! layer, the HTTP layer, and their tests.

pub mod device;
pub mod error;
pub mod geo;
pub mod metrics;
pub mod roles;
pub mod search;
pub mod types;

//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireEditor`] -- Requires the `editor` or `admin` role.
//! - [`rbac::RequireDeviceAdmin`] -- Requires the `admin` role to update a device.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role, neutral 403 otherwise.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
pub mod rbac;

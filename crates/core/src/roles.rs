//! Well-known organisation role names carried in access tokens.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

/// Whether `role` is one of the organisation roles above.
pub fn is_known(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_EDITOR | ROLE_VIEWER)
}

/// Whether `role` may create devices.
pub fn can_edit(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_EDITOR
}

/// Whether `role` holds the admin capability required for update/delete.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

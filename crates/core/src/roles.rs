//! Well-known role name constants.
//!
//! These must match the `role` claim issued by the upstream identity service.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_BARBER: &str = "barber";

/// Roles allowed to edit branch calendars (working hours, overrides, blackouts).
pub fn can_manage_calendar(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_MANAGER
}

//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller (staff user or customer) from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireCalendarManager`] -- Requires a role allowed to edit branch calendars.
//! - [`rbac::RequireStaff`] -- Requires any staff user.

pub mod auth;
pub mod rbac;

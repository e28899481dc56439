//! Service rows (read-only collaborator table).

use chairbook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `services` table.
///
/// `duration_mins` drives appointment end-time derivation at booking time
/// only; editing it later never touches existing appointments.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Service {
    pub id: DbId,
    pub tenant_id: DbId,
    pub branch_id: Option<DbId>,
    pub name: String,
    pub duration_mins: i32,
    pub price_cents: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Service {
    /// Whether this service may be booked at `branch_id`.
    ///
    /// Tenant-wide services (no branch) are bookable everywhere.
    pub fn offered_at(&self, branch_id: DbId) -> bool {
        self.branch_id.map_or(true, |b| b == branch_id)
    }
}

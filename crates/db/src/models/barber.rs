//! Barber rows (read-only collaborator table).

use chairbook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `barbers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Barber {
    pub id: DbId,
    pub tenant_id: DbId,
    pub branch_id: DbId,
    /// Staff account reference; not enforced by a foreign key.
    pub user_id: Option<DbId>,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

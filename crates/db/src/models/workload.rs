//! Barber workload rollups.

use chairbook_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `barber_workloads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BarberWorkload {
    pub id: DbId,
    pub barber_id: DbId,
    pub date: NaiveDate,
    pub total_appointments: i32,
    pub total_hours: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Branch-level projection for one day (computed, not a DB row).
#[derive(Debug, Clone, Serialize)]
pub struct BranchWorkloadSummary {
    pub tenant_id: DbId,
    pub branch_id: DbId,
    pub date: NaiveDate,
    /// Barbers with at least one counted appointment that day.
    pub worked_barbers: i64,
    /// Registered (non-deleted) barbers of the branch.
    pub total_barbers: i64,
    pub total_appointments: i64,
    pub total_hours: f64,
    pub utilisation_percent: f64,
}

/// Query parameters for workload endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadQuery {
    pub date: NaiveDate,
    pub tenant_id: Option<DbId>,
}

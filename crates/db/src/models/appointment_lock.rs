//! Appointment lock (checkout hold) models.

use chairbook_core::booking::TimeWindow;
use chairbook_core::reservation::is_lock_live;
use chairbook_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `appointment_locks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentLock {
    pub id: DbId,
    pub tenant_id: DbId,
    pub branch_id: DbId,
    pub barber_id: DbId,
    pub customer_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub expires_at: Timestamp,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AppointmentLock {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_live(&self, now: Timestamp) -> bool {
        is_lock_live(self.is_active, self.expires_at, now)
    }
}

/// DTO for `CreateLock`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentLock {
    pub tenant_id: DbId,
    pub branch_id: DbId,
    pub barber_id: DbId,
    pub customer_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Query parameters for `GET /api/v1/appointment-locks`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentLockListQuery {
    pub branch_id: DbId,
    pub barber_id: Option<DbId>,
    pub date: NaiveDate,
}

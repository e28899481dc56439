//! Appointment status log (append-only audit trail).

use chairbook_core::appointment::{AppointmentStatus, StatusId};
use chairbook_core::booking::Actor;
use chairbook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `appointment_status_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentStatusLog {
    pub id: DbId,
    pub appointment_id: DbId,
    /// `None` for the entry written when the appointment is created.
    pub old_status_id: Option<StatusId>,
    pub new_status_id: StatusId,
    pub changed_at: Timestamp,
    pub changed_by_user_id: Option<DbId>,
    pub changed_by_customer_id: Option<DbId>,
    pub notes: Option<String>,
}

/// One transition to append.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange<'a> {
    pub appointment_id: DbId,
    pub old_status: Option<AppointmentStatus>,
    pub new_status: AppointmentStatus,
    pub actor: Actor,
    pub notes: Option<&'a str>,
}

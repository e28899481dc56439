//! Appointment entity models and DTOs.

use chairbook_core::appointment::{AppointmentStatus, StatusId};
use chairbook_core::booking::TimeWindow;
use chairbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Maximum length of free-text appointment notes.
pub const MAX_NOTES_LEN: u64 = 2000;

/// A row from the `appointments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: DbId,
    pub tenant_id: DbId,
    pub branch_id: DbId,
    pub service_id: DbId,
    pub barber_id: Option<DbId>,
    pub customer_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status_id: StatusId,
    pub notes: Option<String>,
    /// The appointment this one superseded via reschedule.
    pub rescheduled_from_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Appointment {
    /// Typed status. Rows always carry a seeded status ID, so an unknown
    /// value falls back to `Pending` only if the lookup table was altered.
    pub fn status(&self) -> AppointmentStatus {
        AppointmentStatus::from_id(self.status_id).unwrap_or(AppointmentStatus::Pending)
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// DTO for `CreateAppointment`.
///
/// Required fields are optional here so that a missing value is reported as
/// `InvalidInput` by the booking engine instead of a deserialisation error.
/// There is no end time: it is always derived from the service duration.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateAppointment {
    pub tenant_id: Option<DbId>,
    /// Defaults to the barber's branch, then the service's branch.
    pub branch_id: Option<DbId>,
    pub service_id: Option<DbId>,
    pub barber_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub start_time: Option<Timestamp>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Checkout hold to convert into this booking.
    pub lock_id: Option<DbId>,
}

/// DTO for `RescheduleAppointment`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RescheduleAppointment {
    pub start_time: Timestamp,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// DTO for explicit status changes (confirm, complete, no-show, cancel).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAppointmentStatus {
    pub status: AppointmentStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// DTO for `CancelAppointment`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CancelAppointment {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

/// Typed partial update of the mutable appointment fields.
///
/// Each field is `None` when absent from the payload, `Some(None)` when
/// explicitly set to `null` and `Some(Some(v))` when set to a value.
/// Unknown keys are rejected. Times are never patchable; use reschedule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppointmentPatch {
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none()
    }
}

/// Mark a field present (possibly null) when it appears in the payload.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query parameters for `GET /api/v1/appointments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub tenant_id: Option<DbId>,
    pub branch_id: Option<DbId>,
    pub barber_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub status: Option<AppointmentStatus>,
    /// Only appointments starting at or after this instant.
    pub from: Option<Timestamp>,
    /// Only appointments starting before this instant.
    pub to: Option<Timestamp>,
    /// Include soft-deleted rows (history view).
    #[serde(default)]
    pub include_deleted: bool,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

//! Appointment lifecycle status and state machine.
//!
//! Status IDs match the `appointment_statuses` seed data (1-based SMALLINT).
//! This module lives in `core` (zero internal deps) so the repository layer,
//! the HTTP handlers and the tests all agree on one transition table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Appointment lifecycle status.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending = 1,
    Confirmed = 2,
    Cancelled = 3,
    Completed = 4,
    NoShow = 5,
    Rescheduled = 6,
}

/// Statuses whose time window is reserved on the barber's calendar.
pub const BLOCKING_STATUSES: [AppointmentStatus; 2] =
    [AppointmentStatus::Pending, AppointmentStatus::Confirmed];

/// Statuses that count toward a barber's daily workload.
pub const WORKLOAD_STATUSES: [AppointmentStatus; 3] = [
    AppointmentStatus::Pending,
    AppointmentStatus::Confirmed,
    AppointmentStatus::Completed,
];

impl AppointmentStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Confirmed),
            3 => Some(Self::Cancelled),
            4 => Some(Self::Completed),
            5 => Some(Self::NoShow),
            6 => Some(Self::Rescheduled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::NoShow => "NO_SHOW",
            Self::Rescheduled => "RESCHEDULED",
        }
    }

    /// Whether an appointment in this status occupies the barber's time.
    pub fn is_blocking(self) -> bool {
        BLOCKING_STATUSES.contains(&self)
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        valid_transitions(self).is_empty()
    }

    pub fn counts_toward_workload(self) -> bool {
        WORKLOAD_STATUSES.contains(&self)
    }
}

impl From<AppointmentStatus> for StatusId {
    fn from(value: AppointmentStatus) -> Self {
        value as StatusId
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database IDs of [`BLOCKING_STATUSES`], for binding into SQL `= ANY($n)`.
pub fn blocking_status_ids() -> Vec<StatusId> {
    BLOCKING_STATUSES.iter().map(|s| s.id()).collect()
}

/// Database IDs of [`WORKLOAD_STATUSES`].
pub fn workload_status_ids() -> Vec<StatusId> {
    WORKLOAD_STATUSES.iter().map(|s| s.id()).collect()
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Returns the set of statuses reachable from `from`.
///
/// Cancelled, Completed, NoShow and Rescheduled return an empty slice.
/// A rescheduled row is superseded by the new row it points to and never
/// moves again.
pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match from {
        Pending => &[Confirmed, Cancelled, Rescheduled],
        Confirmed => &[Cancelled, Completed, NoShow, Rescheduled],
        Cancelled | Completed | NoShow | Rescheduled => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    valid_transitions(from).contains(&to)
}

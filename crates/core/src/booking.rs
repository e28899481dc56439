//! Booking primitives shared by the lock manager and the booking engine.
//!
//! - [`TimeWindow`] -- half-open `[start, end)` interval with overlap tests.
//! - [`Actor`] -- who performed a write (staff user XOR customer).
//! - [`SchedulingError`] -- the domain error taxonomy surfaced to callers.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::appointment::{can_transition, AppointmentStatus};
use crate::types::{DbId, Timestamp};

/// Errors produced by availability, lock and booking operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Branch {0} not found")]
    BranchNotFound(DbId),

    #[error("Service {0} not found")]
    ServiceNotFound(DbId),

    #[error("Barber {0} not found")]
    BarberNotFound(DbId),

    #[error("Barber {barber_id} does not belong to branch {branch_id}")]
    BarberMismatch { barber_id: DbId, branch_id: DbId },

    #[error("The requested time slot is no longer available")]
    SlotUnavailable,

    #[error("The requested time slot is already booked")]
    SlotTaken,

    #[error("The requested time slot is held by another customer")]
    SlotLocked,

    #[error("Appointment lock {0} not found")]
    LockNotFound(DbId),

    #[error("Appointment lock does not match the booking: {0}")]
    LockMismatch(String),

    #[error("Appointment {0} not found")]
    AppointmentNotFound(DbId),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidStateTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

/// Validate a status transition against the appointment state machine.
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), SchedulingError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(SchedulingError::InvalidStateTransition { from, to })
    }
}

// ---------------------------------------------------------------------------
// Time windows
// ---------------------------------------------------------------------------

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    /// Build a window, rejecting empty or inverted ranges.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, SchedulingError> {
        if start >= end {
            return Err(SchedulingError::InvalidInput(format!(
                "start ({start}) must be before end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window starting at `start` lasting a service's `duration_mins`.
    ///
    /// The end is always derived, never supplied by the caller.
    pub fn for_service(start: Timestamp, duration_mins: i32) -> Result<Self, SchedulingError> {
        if duration_mins <= 0 {
            return Err(SchedulingError::InvalidInput(format!(
                "service duration must be positive, got {duration_mins} minutes"
            )));
        }
        Self::new(start, start + Duration::minutes(i64::from(duration_mins)))
    }

    /// `[a,b)` and `[c,d)` intersect iff `a < d && c < b`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// The authenticated party performing a write.
///
/// Stored on status logs as a reference, never as an ownership link: the
/// referenced user or customer may have been removed since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    User(DbId),
    Customer(DbId),
    /// Background or maintenance action with no human actor.
    System,
}

impl Actor {
    pub fn user_id(self) -> Option<DbId> {
        match self {
            Actor::User(id) => Some(id),
            _ => None,
        }
    }

    pub fn customer_id(self) -> Option<DbId> {
        match self {
            Actor::Customer(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32, m: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2025, 7, 1, h, m, 0).unwrap()
    }

    fn window(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeWindow {
        TimeWindow::new(at(h1, m1), at(h2, m2)).unwrap()
    }

    #[test]
    fn service_window_derives_end_from_duration() {
        let w = TimeWindow::for_service(at(10, 0), 45).unwrap();
        assert_eq!(w.end, at(10, 45));
        assert_eq!(w.duration(), Duration::minutes(45));
    }

    #[test]
    fn zero_duration_service_is_rejected() {
        assert_matches!(
            TimeWindow::for_service(at(10, 0), 0),
            Err(SchedulingError::InvalidInput(_))
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert_matches!(
            TimeWindow::new(at(11, 0), at(10, 0)),
            Err(SchedulingError::InvalidInput(_))
        );
        assert_matches!(
            TimeWindow::new(at(10, 0), at(10, 0)),
            Err(SchedulingError::InvalidInput(_))
        );
    }

    #[test]
    fn partial_overlap_is_detected_both_ways() {
        let a = window(10, 0, 10, 45);
        let b = window(10, 30, 11, 15);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let a = window(10, 0, 10, 30);
        let b = window(10, 30, 11, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn nested_window_overlaps_and_is_contained() {
        let outer = window(9, 0, 12, 0);
        let inner = window(10, 0, 10, 30);
        assert!(outer.overlaps(&inner));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn completed_to_cancelled_is_an_invalid_transition() {
        assert_eq!(
            validate_transition(AppointmentStatus::Completed, AppointmentStatus::Cancelled),
            Err(SchedulingError::InvalidStateTransition {
                from: AppointmentStatus::Completed,
                to: AppointmentStatus::Cancelled,
            })
        );
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = validate_transition(AppointmentStatus::Cancelled, AppointmentStatus::Pending)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("CANCELLED"));
        assert!(msg.contains("PENDING"));
    }

    #[test]
    fn actor_exposes_exactly_one_reference() {
        assert_eq!(Actor::User(7).user_id(), Some(7));
        assert_eq!(Actor::User(7).customer_id(), None);
        assert_eq!(Actor::Customer(9).customer_id(), Some(9));
        assert_eq!(Actor::System.user_id(), None);
        assert_eq!(Actor::System.customer_id(), None);
    }
}

//! Reservation hold (appointment lock) timing rules.
//!
//! A lock is a short-lived soft reservation. Its `expires_at` is the only
//! thing that bounds its validity; the periodic sweep merely tidies up rows
//! that every read already ignores.

use chrono::Duration;

use crate::booking::{SchedulingError, TimeWindow};
use crate::types::Timestamp;

/// Default hold duration for a checkout lock.
pub const DEFAULT_LOCK_HOLD_MINS: i64 = 7;

/// Compute `expires_at` for a lock created at `now`.
pub fn lock_expiry(now: Timestamp, hold: Duration) -> Timestamp {
    now + hold
}

/// Whether a lock row blocks other bookings at `now`.
///
/// An expired lock never blocks, even if the sweeper has not yet
/// deactivated it.
pub fn is_lock_live(is_active: bool, expires_at: Timestamp, now: Timestamp) -> bool {
    is_active && expires_at > now
}

/// Reject lock requests for windows that already started.
pub fn validate_lock_window(window: &TimeWindow, now: Timestamp) -> Result<(), SchedulingError> {
    if window.start < now {
        return Err(SchedulingError::InvalidInput(
            "cannot hold a slot that has already started".into(),
        ));
    }
    Ok(())
}

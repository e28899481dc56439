//! Branch calendar rules: weekly working hours, date overrides, blackouts.

use chairbook_core::availability::{Blackout, DayRule};
use chairbook_core::types::{DbId, Timestamp};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Working hours
// ---------------------------------------------------------------------------

/// A row from the `working_hours` table. Weekday 0 = Sunday.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkingHour {
    pub id: DbId,
    pub branch_id: DbId,
    pub weekday: i16,
    pub is_open: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkingHour {
    pub fn rule(&self) -> DayRule {
        DayRule::from_columns(self.is_open, self.start_time, self.end_time)
    }
}

/// DTO for upserting one weekday of a branch's working hours.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertWorkingHour {
    #[validate(range(min = 0, max = 6))]
    pub weekday: i16,
    pub is_open: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

// ---------------------------------------------------------------------------
// Working-day overrides
// ---------------------------------------------------------------------------

/// A row from the `working_day_overrides` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkingDayOverride {
    pub id: DbId,
    pub branch_id: DbId,
    pub date: NaiveDate,
    pub is_open: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkingDayOverride {
    pub fn rule(&self) -> DayRule {
        DayRule::from_columns(self.is_open, self.start_time, self.end_time)
    }
}

/// DTO for upserting a date-specific override.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertWorkingDayOverride {
    pub date: NaiveDate,
    pub is_open: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

// ---------------------------------------------------------------------------
// Unavailabilities
// ---------------------------------------------------------------------------

/// A row from the `unavailabilities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Unavailability {
    pub id: DbId,
    pub branch_id: DbId,
    /// `None` for a branch-wide blackout.
    pub barber_id: Option<DbId>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

impl Unavailability {
    pub fn blackout(&self) -> Blackout {
        Blackout {
            date: self.date,
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// DTO for creating a blackout.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUnavailability {
    pub barber_id: Option<DbId>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Inclusive date window for calendar listings.
#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Validate the optional time pair on an open rule or a partial blackout.
pub fn validate_time_pair(
    required: bool,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
) -> Result<(), String> {
    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(()),
        (Some(_), Some(_)) => Err("start_time must be before end_time".into()),
        (None, None) if !required => Ok(()),
        (None, None) => Err("start_time and end_time are required when open".into()),
        _ => Err("start_time and end_time must be given together".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, 0, 0)
    }

    #[test]
    fn open_rules_need_ordered_times() {
        assert!(validate_time_pair(true, t(9), t(17)).is_ok());
        assert!(validate_time_pair(true, t(17), t(9)).is_err());
        assert!(validate_time_pair(true, None, None).is_err());
    }

    #[test]
    fn blackout_times_are_optional_but_paired() {
        assert!(validate_time_pair(false, None, None).is_ok());
        assert!(validate_time_pair(false, t(9), None).is_err());
    }
}

//! Availability calculator.
//!
//! Derives capacity slots for a branch from its weekly working hours,
//! date-specific overrides and blackout periods. Pure logic: the repository
//! layer loads the rules and the booked/locked windows, this module does the
//! arithmetic.
//!
//! Precedence for a given date: an override (open or closed) fully replaces
//! the weekday rule; without an override the weekday rule applies; a missing
//! weekday rule means closed.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::booking::{SchedulingError, TimeWindow};
use crate::types::Timestamp;

/// Default slot size in minutes.
pub const DEFAULT_SLOT_GRANULARITY_MINS: i64 = 30;

/// Default maximum number of days a single availability query may span.
pub const DEFAULT_MAX_RANGE_DAYS: i64 = 62;

/// Weekday encoding used by `working_hours.weekday`: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// Operating rule for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRule {
    Closed,
    Open { start: NaiveTime, end: NaiveTime },
}

impl DayRule {
    /// Build a rule from the nullable columns stored on working-hour rows.
    ///
    /// Rows flagged open but with missing or inverted times are treated as
    /// closed rather than producing an empty or negative window.
    pub fn from_columns(
        is_open: bool,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Self {
        match (is_open, start, end) {
            (true, Some(start), Some(end)) if start < end => DayRule::Open { start, end },
            _ => DayRule::Closed,
        }
    }
}

/// A blackout on a single date. Without times it covers the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blackout {
    pub date: NaiveDate,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl Blackout {
    pub fn window(&self) -> Result<TimeWindow, SchedulingError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Ok(TimeWindow {
                start: at(self.date, start),
                end: at(self.date, end),
            }),
            _ => day_window(self.date),
        }
    }
}

/// The calendar rules of one branch, as loaded from storage.
#[derive(Debug, Clone, Default)]
pub struct CalendarRules {
    /// Keyed by [`weekday_index`].
    pub weekly: HashMap<i16, DayRule>,
    pub overrides: HashMap<NaiveDate, DayRule>,
}

impl CalendarRules {
    /// Resolve the operating window for `date`, override first.
    pub fn operating_window(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
        let rule = self
            .overrides
            .get(&date)
            .or_else(|| self.weekly.get(&weekday_index(date)))
            .copied()
            .unwrap_or(DayRule::Closed);

        match rule {
            DayRule::Open { start, end } => Some((start, end)),
            DayRule::Closed => None,
        }
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Validate `from <= to`, that the span does not exceed `max_days` and
    /// that the last day still has a representable end.
    pub fn new(from: NaiveDate, to: NaiveDate, max_days: i64) -> Result<Self, SchedulingError> {
        if from > to {
            return Err(SchedulingError::InvalidInput(format!(
                "date range start {from} is after end {to}"
            )));
        }
        let span = (to - from).num_days() + 1;
        if span > max_days {
            return Err(SchedulingError::InvalidInput(format!(
                "date range spans {span} days, maximum is {max_days}"
            )));
        }
        day_window(to)?;
        Ok(Self { from, to })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(move |d| *d <= self.to)
    }

    /// Timestamp window covering every day in the range.
    pub fn window(&self) -> Result<TimeWindow, SchedulingError> {
        Ok(TimeWindow {
            start: at(self.from, NaiveTime::MIN),
            end: day_window(self.to)?.end,
        })
    }
}

/// Presentation status of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked,
    Locked,
    Unavailable,
}

/// A candidate half-open slot `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: Timestamp,
    pub end: Timestamp,
    pub status: SlotStatus,
}

/// Windows that reduce a barber's capacity.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    pub blackouts: Vec<TimeWindow>,
    pub booked: Vec<TimeWindow>,
    pub locked: Vec<TimeWindow>,
}

/// Validate a slot granularity and convert it to a [`Duration`].
pub fn granularity(minutes: i64) -> Result<Duration, SchedulingError> {
    if minutes <= 0 || minutes > 24 * 60 {
        return Err(SchedulingError::InvalidInput(format!(
            "slot granularity must be between 1 and 1440 minutes, got {minutes}"
        )));
    }
    Ok(Duration::minutes(minutes))
}

/// Split `[start, end)` on `date` into consecutive slots of `step`.
///
/// A trailing remainder shorter than `step` is dropped.
pub fn partition_window(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    step: Duration,
) -> Vec<TimeWindow> {
    let close = at(date, end);
    let mut cursor = at(date, start);
    let mut slots = Vec::new();
    while let Some(next) = cursor.checked_add_signed(step).filter(|n| *n <= close) {
        slots.push(TimeWindow {
            start: cursor,
            end: next,
        });
        cursor = next;
    }
    slots
}

/// All capacity windows for the range, in chronological order.
pub fn capacity_windows(range: &DateRange, rules: &CalendarRules, step: Duration) -> Vec<TimeWindow> {
    range
        .days()
        .filter_map(|date| {
            rules
                .operating_window(date)
                .map(|(start, end)| partition_window(date, start, end, step))
        })
        .flatten()
        .collect()
}

/// Branch capacity slots minus branch-wide blackouts.
///
/// Booked appointments and locks are not subtracted here; the booking
/// engine re-checks overlap at commit time.
pub fn capacity_slots(
    range: &DateRange,
    rules: &CalendarRules,
    blackouts: &[Blackout],
    step: Duration,
) -> Result<Vec<Slot>, SchedulingError> {
    let blocked = blackouts
        .iter()
        .map(Blackout::window)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(capacity_windows(range, rules, step)
        .into_iter()
        .filter(|slot| !blocked.iter().any(|b| b.overlaps(slot)))
        .map(|w| Slot {
            start: w.start,
            end: w.end,
            status: SlotStatus::Available,
        })
        .collect())
}

/// Label each capacity window for a specific barber.
///
/// Precedence when several apply: unavailable, then booked, then locked.
pub fn label_slots(windows: Vec<TimeWindow>, occupancy: &Occupancy) -> Vec<Slot> {
    windows
        .into_iter()
        .map(|w| {
            let hits = |set: &[TimeWindow]| set.iter().any(|o| o.overlaps(&w));
            let status = if hits(&occupancy.blackouts) {
                SlotStatus::Unavailable
            } else if hits(&occupancy.booked) {
                SlotStatus::Booked
            } else if hits(&occupancy.locked) {
                SlotStatus::Locked
            } else {
                SlotStatus::Available
            };
            Slot {
                start: w.start,
                end: w.end,
                status,
            }
        })
        .collect()
}

/// Whole-day window `[date 00:00, date+1 00:00)`.
///
/// Fails for the last representable date, whose end has no timestamp.
pub fn day_window(date: NaiveDate) -> Result<TimeWindow, SchedulingError> {
    let start = at(date, NaiveTime::MIN);
    let end = start
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| SchedulingError::InvalidInput(format!("date {date} is out of range")))?;
    Ok(TimeWindow { start, end })
}

fn at(date: NaiveDate, time: NaiveTime) -> Timestamp {
    date.and_time(time).and_utc()
}

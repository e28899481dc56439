//! Loads calendar rules and occupancy, then hands them to the pure
//! availability calculator in `chairbook_core::availability`.

use chairbook_core::availability::{
    capacity_slots, capacity_windows, label_slots, Blackout, CalendarRules,
    DateRange, Occupancy, Slot,
};
use chairbook_core::booking::SchedulingError;
use chairbook_core::types::{DbId, Timestamp};
use chrono::Duration;
use sqlx::PgPool;

use crate::error::EngineError;
use crate::repositories::{
    AppointmentLockRepo, AppointmentRepo, BarberRepo, BranchRepo, UnavailabilityRepo,
    WorkingDayOverrideRepo, WorkingHourRepo,
};

/// Read-only availability queries. Nothing here writes or locks.
pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// Weekly rules plus the overrides that fall inside `range`.
    pub async fn load_rules(
        pool: &PgPool,
        branch_id: DbId,
        range: &DateRange,
    ) -> Result<CalendarRules, sqlx::Error> {
        let mut rules = CalendarRules::default();
        for row in WorkingHourRepo::list_by_branch(pool, branch_id).await? {
            rules.weekly.insert(row.weekday, row.rule());
        }
        for row in WorkingDayOverrideRepo::list_by_branch(pool, branch_id, range.from, range.to).await? {
            rules.overrides.insert(row.date, row.rule());
        }
        Ok(rules)
    }

    /// Capacity slots of a branch over `range`, minus branch-wide blackouts.
    ///
    /// Appointments and locks are not subtracted.
    pub async fn branch_slots(
        pool: &PgPool,
        tenant_id: DbId,
        branch_id: DbId,
        range: &DateRange,
        step: Duration,
    ) -> Result<Vec<Slot>, EngineError> {
        BranchRepo::find_for_tenant(pool, tenant_id, branch_id)
            .await?
            .ok_or(SchedulingError::BranchNotFound(branch_id))?;

        let rules = Self::load_rules(pool, branch_id, range).await?;
        let blackouts: Vec<Blackout> =
            UnavailabilityRepo::list_applicable(pool, branch_id, None, range.from, range.to)
                .await?
                .iter()
                .map(|u| u.blackout())
                .collect();

        Ok(capacity_slots(range, &rules, &blackouts, step)?)
    }

    /// Capacity slots of the barber's branch labelled for that barber.
    ///
    /// `viewer` is the customer looking at the calendar; their own holds
    /// are shown as available.
    pub async fn barber_slots(
        pool: &PgPool,
        barber_id: DbId,
        range: &DateRange,
        step: Duration,
        viewer: Option<DbId>,
        now: Timestamp,
    ) -> Result<Vec<Slot>, EngineError> {
        let barber = BarberRepo::find_by_id(pool, barber_id)
            .await?
            .ok_or(SchedulingError::BarberNotFound(barber_id))?;

        let rules = Self::load_rules(pool, barber.branch_id, range).await?;
        let span = range.window()?;

        let occupancy = Occupancy {
            blackouts: UnavailabilityRepo::list_applicable(
                pool,
                barber.branch_id,
                Some(barber.id),
                range.from,
                range.to,
            )
            .await?
            .iter()
            .map(|u| u.blackout().window())
            .collect::<Result<_, _>>()?,
            booked: AppointmentRepo::blocking_windows(pool, barber.id, &span).await?,
            locked: AppointmentLockRepo::live_overlapping(pool, barber.id, &span, now, viewer)
                .await?
                .iter()
                .map(|l| l.window())
                .collect(),
        };

        Ok(label_slots(capacity_windows(range, &rules, step), &occupancy))
    }
}

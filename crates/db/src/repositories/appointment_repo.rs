//! Booking engine over the `appointments` table.
//!
//! Every write runs in a single transaction that first serialises on the
//! barber row ([`BarberRepo::lock_for_update`]), then re-checks overlap,
//! writes the appointment, appends the status log and recomputes the
//! affected workload days. The `ex_appointments_barber_overlap` exclusion
//! constraint rejects any overlap the check could still miss; its violation
//! surfaces as `SlotUnavailable` like the check itself.

use chairbook_core::appointment::{blocking_status_ids, AppointmentStatus};
use chairbook_core::booking::{validate_transition, Actor, SchedulingError, TimeWindow};
use chairbook_core::types::{DbId, Timestamp};
use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use validator::Validate;

use crate::error::{classify_insert_error, EngineError};
use crate::models::appointment::{
    Appointment, AppointmentListQuery, AppointmentPatch, CreateAppointment, RescheduleAppointment,
    MAX_NOTES_LEN,
};
use crate::models::barber::Barber;
use crate::models::status_log::StatusChange;
use crate::repositories::{
    AppointmentLockRepo, BarberRepo, BranchRepo, CustomerRepo, ServiceRepo, StatusLogRepo,
    WorkloadRepo,
};

/// Column list for appointments queries.
const COLUMNS: &str = "\
    id, tenant_id, branch_id, service_id, barber_id, customer_id, \
    start_time, end_time, status_id, notes, rescheduled_from_id, \
    created_at, updated_at, deleted_at";

/// Maximum page size for appointment listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for appointment listing.
const DEFAULT_LIMIT: i64 = 50;

/// Transactional booking operations and appointment queries.
pub struct AppointmentRepo;

impl AppointmentRepo {
    // -----------------------------------------------------------------------
    // Booking writes
    // -----------------------------------------------------------------------

    /// Book an appointment in PENDING.
    ///
    /// The end time is always `start + service.duration_mins`. With a
    /// barber, overlap against PENDING/CONFIRMED appointments is re-checked
    /// under the barber lock (`SlotUnavailable`), the optional `lock_id` is
    /// converted, and live holds of other customers block (`SlotLocked`).
    pub async fn create(
        pool: &PgPool,
        input: &CreateAppointment,
        actor: Actor,
    ) -> Result<Appointment, EngineError> {
        input
            .validate()
            .map_err(|e| SchedulingError::InvalidInput(e.to_string()))?;
        let tenant_id = required(input.tenant_id, "tenant_id")?;
        let service_id = required(input.service_id, "service_id")?;
        let customer_id = required(input.customer_id, "customer_id")?;
        let start_time = required(input.start_time, "start_time")?;
        if input.lock_id.is_some() && input.barber_id.is_none() {
            return Err(SchedulingError::LockMismatch(
                "a lock can only be converted into a booking with a barber".into(),
            )
            .into());
        }

        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let service = ServiceRepo::find_by_id(&mut *tx, service_id)
            .await?
            .filter(|s| s.tenant_id == tenant_id)
            .ok_or(SchedulingError::ServiceNotFound(service_id))?;
        let window = TimeWindow::for_service(start_time, service.duration_mins)?;

        let barber: Option<Barber> = match input.barber_id {
            Some(barber_id) => Some(
                BarberRepo::lock_for_update(&mut *tx, barber_id)
                    .await?
                    .filter(|b| b.is_active)
                    .ok_or(SchedulingError::BarberNotFound(barber_id))?,
            ),
            None => None,
        };

        let branch_id = input
            .branch_id
            .or(barber.as_ref().map(|b| b.branch_id))
            .or(service.branch_id)
            .ok_or_else(|| SchedulingError::InvalidInput("branch_id is required".into()))?;
        BranchRepo::find_for_tenant(&mut *tx, tenant_id, branch_id)
            .await?
            .ok_or(SchedulingError::BranchNotFound(branch_id))?;
        if let Some(barber) = &barber {
            if barber.tenant_id != tenant_id || barber.branch_id != branch_id {
                return Err(SchedulingError::BarberMismatch {
                    barber_id: barber.id,
                    branch_id,
                }
                .into());
            }
        }
        if !service.offered_at(branch_id) {
            return Err(SchedulingError::ServiceNotFound(service_id).into());
        }
        if !CustomerRepo::exists_in_tenant(&mut *tx, tenant_id, customer_id).await? {
            return Err(
                SchedulingError::InvalidInput(format!("customer {customer_id} not found")).into(),
            );
        }

        if let Some(barber) = &barber {
            if Self::has_blocking_overlap(&mut *tx, barber.id, &window, None).await? {
                tracing::debug!(barber_id = barber.id, start = %window.start, "Booking rejected: overlap");
                return Err(SchedulingError::SlotUnavailable.into());
            }
            if let Some(lock_id) = input.lock_id {
                AppointmentLockRepo::consume(&mut *tx, lock_id, customer_id, barber.id, &window, now)
                    .await?;
            }
            let held = AppointmentLockRepo::live_overlapping(
                &mut *tx,
                barber.id,
                &window,
                now,
                Some(customer_id),
            )
            .await?;
            if !held.is_empty() {
                tracing::debug!(barber_id = barber.id, start = %window.start, "Booking rejected: slot held");
                return Err(SchedulingError::SlotLocked.into());
            }
        }

        let appointment = Self::insert(
            &mut *tx,
            NewRow {
                tenant_id,
                branch_id,
                service_id,
                barber_id: barber.as_ref().map(|b| b.id),
                customer_id,
                window,
                notes: input.notes.as_deref(),
                rescheduled_from_id: None,
            },
        )
        .await?;

        StatusLogRepo::log_status_change(
            &mut *tx,
            &StatusChange {
                appointment_id: appointment.id,
                old_status: None,
                new_status: AppointmentStatus::Pending,
                actor,
                notes: None,
            },
        )
        .await?;
        Self::refresh_workload(&mut *tx, appointment.barber_id, &[appointment.start_time]).await?;

        tx.commit().await?;

        tracing::info!(
            appointment_id = appointment.id,
            barber_id = ?appointment.barber_id,
            customer_id,
            start = %appointment.start_time,
            end = %appointment.end_time,
            "Appointment created"
        );
        Ok(appointment)
    }

    /// Move an appointment to a new start time.
    ///
    /// The current row becomes RESCHEDULED and a new PENDING row with the
    /// same service, barber and customer is inserted pointing back at it
    /// through `rescheduled_from_id`. Both transitions are logged. Returns
    /// the new row.
    pub async fn reschedule(
        pool: &PgPool,
        id: DbId,
        input: &RescheduleAppointment,
        actor: Actor,
    ) -> Result<Appointment, EngineError> {
        input
            .validate()
            .map_err(|e| SchedulingError::InvalidInput(e.to_string()))?;
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let current = Self::lock_row(&mut *tx, id, false)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(id))?;
        validate_transition(current.status(), AppointmentStatus::Rescheduled)?;

        let service = ServiceRepo::find_by_id(&mut *tx, current.service_id)
            .await?
            .ok_or(SchedulingError::ServiceNotFound(current.service_id))?;
        let window = TimeWindow::for_service(input.start_time, service.duration_mins)?;

        if let Some(barber_id) = current.barber_id {
            if Self::has_blocking_overlap(&mut *tx, barber_id, &window, Some(current.id)).await? {
                return Err(SchedulingError::SlotUnavailable.into());
            }
            let held = AppointmentLockRepo::live_overlapping(
                &mut *tx,
                barber_id,
                &window,
                now,
                Some(current.customer_id),
            )
            .await?;
            if !held.is_empty() {
                return Err(SchedulingError::SlotLocked.into());
            }
        }

        Self::set_status(&mut *tx, current.id, AppointmentStatus::Rescheduled).await?;
        StatusLogRepo::log_status_change(
            &mut *tx,
            &StatusChange {
                appointment_id: current.id,
                old_status: Some(current.status()),
                new_status: AppointmentStatus::Rescheduled,
                actor,
                notes: input.notes.as_deref(),
            },
        )
        .await?;

        let notes = input.notes.as_deref().or(current.notes.as_deref());
        let replacement = Self::insert(
            &mut *tx,
            NewRow {
                tenant_id: current.tenant_id,
                branch_id: current.branch_id,
                service_id: current.service_id,
                barber_id: current.barber_id,
                customer_id: current.customer_id,
                window,
                notes,
                rescheduled_from_id: Some(current.id),
            },
        )
        .await?;
        StatusLogRepo::log_status_change(
            &mut *tx,
            &StatusChange {
                appointment_id: replacement.id,
                old_status: None,
                new_status: AppointmentStatus::Pending,
                actor,
                notes: None,
            },
        )
        .await?;

        Self::refresh_workload(
            &mut *tx,
            current.barber_id,
            &[current.start_time, replacement.start_time],
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            appointment_id = current.id,
            new_appointment_id = replacement.id,
            start = %replacement.start_time,
            "Appointment rescheduled"
        );
        Ok(replacement)
    }

    /// Cancel a PENDING or CONFIRMED appointment.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        actor: Actor,
        reason: Option<&str>,
    ) -> Result<Appointment, EngineError> {
        Self::update_status(pool, id, AppointmentStatus::Cancelled, actor, reason).await
    }

    /// Apply one state-machine transition and log it.
    ///
    /// RESCHEDULED is only reachable through [`AppointmentRepo::reschedule`].
    /// An invalid transition writes nothing.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: AppointmentStatus,
        actor: Actor,
        notes: Option<&str>,
    ) -> Result<Appointment, EngineError> {
        if status == AppointmentStatus::Rescheduled {
            return Err(SchedulingError::InvalidInput(
                "use reschedule to move an appointment to a new time".into(),
            )
            .into());
        }
        check_notes(notes)?;

        let mut tx = pool.begin().await?;
        let current = Self::lock_row(&mut *tx, id, false)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(id))?;
        validate_transition(current.status(), status)?;

        let updated = Self::set_status(&mut *tx, id, status).await?;
        StatusLogRepo::log_status_change(
            &mut *tx,
            &StatusChange {
                appointment_id: id,
                old_status: Some(current.status()),
                new_status: status,
                actor,
                notes,
            },
        )
        .await?;
        Self::refresh_workload(&mut *tx, updated.barber_id, &[updated.start_time]).await?;

        tx.commit().await?;

        tracing::info!(
            appointment_id = id,
            from = %current.status(),
            to = %status,
            "Appointment status changed"
        );
        Ok(updated)
    }

    /// Apply a typed partial update. Only `notes` is patchable.
    pub async fn update_details(
        pool: &PgPool,
        id: DbId,
        patch: &AppointmentPatch,
    ) -> Result<Appointment, EngineError> {
        let notes = patch.notes.as_ref().and_then(|n| n.as_deref());
        check_notes(notes)?;
        if patch.is_empty() {
            return Self::find_by_id(pool, id)
                .await?
                .ok_or_else(|| SchedulingError::AppointmentNotFound(id).into());
        }

        let query = format!(
            "UPDATE appointments SET \
                 notes = CASE WHEN $2 THEN $3 ELSE notes END \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(patch.notes.is_some())
            .bind(notes)
            .fetch_optional(pool)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(id))?;
        Ok(updated)
    }

    /// Set the tombstone. Returns `false` if no live row matched.
    ///
    /// The row stops counting toward overlap and workload immediately.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, EngineError> {
        let mut tx = pool.begin().await?;
        let Some(current) = Self::lock_row(&mut *tx, id, false).await? else {
            return Ok(false);
        };

        sqlx::query("UPDATE appointments SET deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::refresh_workload(&mut *tx, current.barber_id, &[current.start_time]).await?;

        tx.commit().await?;
        tracing::info!(appointment_id = id, "Appointment soft-deleted");
        Ok(true)
    }

    /// Permanently delete an appointment and its status history.
    ///
    /// Works on soft-deleted rows too. Returns `false` if no row matched.
    pub async fn purge(pool: &PgPool, id: DbId) -> Result<bool, EngineError> {
        let mut tx = pool.begin().await?;
        let Some(current) = Self::lock_row(&mut *tx, id, true).await? else {
            return Ok(false);
        };

        let logs = StatusLogRepo::delete_by_appointment(&mut *tx, id).await?;
        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::refresh_workload(&mut *tx, current.barber_id, &[current.start_time]).await?;

        tx.commit().await?;
        tracing::info!(appointment_id = id, status_logs = logs, "Appointment purged");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a live (non-deleted) appointment by ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM appointments WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an appointment by ID, soft-deleted or not.
    pub async fn find_including_deleted(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List appointments matching the filter, ordered by start time.
    pub async fn list(
        pool: &PgPool,
        params: &AppointmentListQuery,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM appointments \
             WHERE ($1::BIGINT IS NULL OR tenant_id = $1) \
               AND ($2::BIGINT IS NULL OR branch_id = $2) \
               AND ($3::BIGINT IS NULL OR barber_id = $3) \
               AND ($4::BIGINT IS NULL OR customer_id = $4) \
               AND ($5::SMALLINT IS NULL OR status_id = $5) \
               AND ($6::TIMESTAMPTZ IS NULL OR start_time >= $6) \
               AND ($7::TIMESTAMPTZ IS NULL OR start_time < $7) \
               AND ($8::BOOLEAN OR deleted_at IS NULL) \
             ORDER BY start_time ASC, id ASC \
             LIMIT $9 OFFSET $10"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(params.tenant_id)
            .bind(params.branch_id)
            .bind(params.barber_id)
            .bind(params.customer_id)
            .bind(params.status.map(|s| s.id()))
            .bind(params.from)
            .bind(params.to)
            .bind(params.include_deleted)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Whether the barber has no PENDING/CONFIRMED appointment overlapping
    /// `[start, end)`. Read-only.
    pub async fn check_barber_availability(
        pool: &PgPool,
        barber_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<bool, EngineError> {
        let window = TimeWindow::new(start, end)?;
        BarberRepo::find_by_id(pool, barber_id)
            .await?
            .ok_or(SchedulingError::BarberNotFound(barber_id))?;
        Ok(!Self::has_blocking_overlap(pool, barber_id, &window, None).await?)
    }

    /// Barbers of a branch that are free for the whole of `[start, end)`.
    pub async fn available_barbers(
        pool: &PgPool,
        branch_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Barber>, EngineError> {
        let window = TimeWindow::new(start, end)?;
        BranchRepo::find_by_id(pool, branch_id)
            .await?
            .ok_or(SchedulingError::BranchNotFound(branch_id))?;
        Ok(BarberRepo::list_free(pool, branch_id, &window).await?)
    }

    /// Whether any PENDING/CONFIRMED appointment of the barber overlaps
    /// `window`, optionally ignoring one appointment.
    pub async fn has_blocking_overlap(
        executor: impl PgExecutor<'_>,
        barber_id: DbId,
        window: &TimeWindow,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM appointments \
                 WHERE barber_id = $1 AND deleted_at IS NULL \
                   AND status_id = ANY($2) \
                   AND start_time < $4 AND end_time > $3 \
                   AND ($5::BIGINT IS NULL OR id <> $5) \
             )",
        )
        .bind(barber_id)
        .bind(blocking_status_ids())
        .bind(window.start)
        .bind(window.end)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Windows of the barber's PENDING/CONFIRMED appointments overlapping
    /// `window`, ordered by start.
    pub async fn blocking_windows(
        executor: impl PgExecutor<'_>,
        barber_id: DbId,
        window: &TimeWindow,
    ) -> Result<Vec<TimeWindow>, sqlx::Error> {
        let rows: Vec<(Timestamp, Timestamp)> = sqlx::query_as(
            "SELECT start_time, end_time FROM appointments \
             WHERE barber_id = $1 AND deleted_at IS NULL \
               AND status_id = ANY($2) \
               AND start_time < $4 AND end_time > $3 \
             ORDER BY start_time",
        )
        .bind(barber_id)
        .bind(blocking_status_ids())
        .bind(window.start)
        .bind(window.end)
        .fetch_all(executor)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(start, end)| TimeWindow { start, end })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Lock an appointment row, taking its barber's lock first.
    async fn lock_row(
        conn: &mut PgConnection,
        id: DbId,
        include_deleted: bool,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let tombstone = if include_deleted { "" } else { " AND deleted_at IS NULL" };
        let peek_query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1{tombstone}");
        let Some(peek) = sqlx::query_as::<_, Appointment>(&peek_query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        // barber_id never changes on an existing row, so locking the barber
        // seen in the unlocked read is safe.
        if let Some(barber_id) = peek.barber_id {
            BarberRepo::lock_for_update(&mut *conn, barber_id).await?;
        }

        let query = format!("{peek_query} FOR UPDATE");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: AppointmentStatus,
    ) -> Result<Appointment, sqlx::Error> {
        let query = format!("UPDATE appointments SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_one(conn)
            .await
    }

    async fn insert(conn: &mut PgConnection, row: NewRow<'_>) -> Result<Appointment, EngineError> {
        let query = format!(
            "INSERT INTO appointments \
                 (tenant_id, branch_id, service_id, barber_id, customer_id, \
                  start_time, end_time, status_id, notes, rescheduled_from_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(row.tenant_id)
            .bind(row.branch_id)
            .bind(row.service_id)
            .bind(row.barber_id)
            .bind(row.customer_id)
            .bind(row.window.start)
            .bind(row.window.end)
            .bind(AppointmentStatus::Pending.id())
            .bind(row.notes)
            .bind(row.rescheduled_from_id)
            .fetch_one(conn)
            .await
            .map_err(classify_insert_error)
    }

    /// Recompute the barber's workload for each distinct UTC day touched.
    async fn refresh_workload(
        conn: &mut PgConnection,
        barber_id: Option<DbId>,
        starts: &[Timestamp],
    ) -> Result<(), EngineError> {
        let Some(barber_id) = barber_id else {
            return Ok(());
        };
        let mut days: Vec<NaiveDate> = starts.iter().map(|t| t.date_naive()).collect();
        days.sort_unstable();
        days.dedup();
        for day in days {
            WorkloadRepo::recompute(&mut *conn, barber_id, day).await?;
        }
        Ok(())
    }
}

/// Column values for a freshly inserted PENDING appointment.
struct NewRow<'a> {
    tenant_id: DbId,
    branch_id: DbId,
    service_id: DbId,
    barber_id: Option<DbId>,
    customer_id: DbId,
    window: TimeWindow,
    notes: Option<&'a str>,
    rescheduled_from_id: Option<DbId>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, SchedulingError> {
    value.ok_or_else(|| SchedulingError::InvalidInput(format!("{field} is required")))
}

fn check_notes(notes: Option<&str>) -> Result<(), SchedulingError> {
    match notes {
        Some(n) if n.chars().count() as u64 > MAX_NOTES_LEN => Err(SchedulingError::InvalidInput(
            format!("notes must be at most {MAX_NOTES_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

//! Reservation lock manager over the `appointment_locks` table.
//!
//! A lock is a short checkout hold on a barber's time range. Expiry is
//! evaluated against `now` on every read, so a lock past `expires_at` never
//! blocks anything even before [`AppointmentLockRepo::cleanup_expired`]
//! has flipped its `is_active` flag.

use chairbook_core::availability::day_window;
use chairbook_core::booking::{SchedulingError, TimeWindow};
use chairbook_core::reservation::{lock_expiry, validate_lock_window};
use chairbook_core::types::{DbId, Timestamp};
use chrono::{Duration, NaiveDate, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::error::EngineError;
use crate::models::appointment_lock::{AppointmentLock, CreateAppointmentLock};
use crate::repositories::{AppointmentRepo, BarberRepo, CustomerRepo};

const COLUMNS: &str = "id, tenant_id, branch_id, barber_id, customer_id, start_time, end_time, \
    expires_at, is_active, created_at, updated_at";

pub struct AppointmentLockRepo;

impl AppointmentLockRepo {
    /// Hold `[start, end)` on a barber's calendar for `hold`.
    ///
    /// The customer must belong to the lock's tenant. Fails with `SlotTaken`
    /// when a PENDING/CONFIRMED appointment overlaps and with `SlotLocked`
    /// when any live lock overlaps.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAppointmentLock,
        hold: Duration,
    ) -> Result<AppointmentLock, EngineError> {
        let now = Utc::now();
        let window = TimeWindow::new(input.start_time, input.end_time)?;
        validate_lock_window(&window, now)?;

        let mut tx = pool.begin().await?;

        let barber = BarberRepo::lock_for_update(&mut *tx, input.barber_id)
            .await?
            .filter(|b| b.is_active)
            .ok_or(SchedulingError::BarberNotFound(input.barber_id))?;
        if barber.tenant_id != input.tenant_id || barber.branch_id != input.branch_id {
            return Err(SchedulingError::BarberMismatch {
                barber_id: barber.id,
                branch_id: input.branch_id,
            }
            .into());
        }
        if !CustomerRepo::exists_in_tenant(&mut *tx, input.tenant_id, input.customer_id).await? {
            return Err(SchedulingError::InvalidInput(format!(
                "customer {} not found",
                input.customer_id
            ))
            .into());
        }

        if AppointmentRepo::has_blocking_overlap(&mut *tx, barber.id, &window, None).await? {
            return Err(SchedulingError::SlotTaken.into());
        }
        if !Self::live_overlapping(&mut *tx, barber.id, &window, now, None)
            .await?
            .is_empty()
        {
            return Err(SchedulingError::SlotLocked.into());
        }

        let query = format!(
            "INSERT INTO appointment_locks \
                 (tenant_id, branch_id, barber_id, customer_id, start_time, end_time, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let lock = sqlx::query_as::<_, AppointmentLock>(&query)
            .bind(input.tenant_id)
            .bind(input.branch_id)
            .bind(barber.id)
            .bind(input.customer_id)
            .bind(window.start)
            .bind(window.end)
            .bind(lock_expiry(now, hold))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            lock_id = lock.id,
            barber_id = lock.barber_id,
            customer_id = lock.customer_id,
            expires_at = %lock.expires_at,
            "Appointment lock created"
        );
        Ok(lock)
    }

    /// Deactivate a live lock. Releasing an inactive, expired or unknown
    /// lock yields `LockNotFound`; expired rows are left for the sweeper.
    pub async fn release(pool: &PgPool, id: DbId) -> Result<AppointmentLock, EngineError> {
        let query = format!(
            "UPDATE appointment_locks SET is_active = FALSE \
             WHERE id = $1 AND is_active AND expires_at > NOW() \
             RETURNING {COLUMNS}"
        );
        let lock = sqlx::query_as::<_, AppointmentLock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(SchedulingError::LockNotFound(id))?;
        tracing::info!(lock_id = id, barber_id = lock.barber_id, "Appointment lock released");
        Ok(lock)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AppointmentLock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointment_locks WHERE id = $1");
        sqlx::query_as::<_, AppointmentLock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Live locks of a branch touching `date`, optionally for one barber,
    /// ordered by start time.
    pub async fn list_active(
        pool: &PgPool,
        branch_id: DbId,
        barber_id: Option<DbId>,
        date: NaiveDate,
        now: Timestamp,
    ) -> Result<Vec<AppointmentLock>, EngineError> {
        let day = day_window(date)?;
        let query = format!(
            "SELECT {COLUMNS} FROM appointment_locks \
             WHERE branch_id = $1 \
               AND ($2::BIGINT IS NULL OR barber_id = $2) \
               AND is_active AND expires_at > $3 \
               AND start_time < $5 AND end_time > $4 \
             ORDER BY start_time, id"
        );
        let locks = sqlx::query_as::<_, AppointmentLock>(&query)
            .bind(branch_id)
            .bind(barber_id)
            .bind(now)
            .bind(day.start)
            .bind(day.end)
            .fetch_all(pool)
            .await?;
        Ok(locks)
    }

    /// Deactivate every active lock whose `expires_at` is at or before `now`.
    ///
    /// Returns the number of locks swept. Touches only rows that no read
    /// treats as live anymore, so it never races with lock creation.
    pub async fn cleanup_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointment_locks SET is_active = FALSE \
             WHERE is_active AND expires_at <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Live locks of a barber overlapping `window`.
    ///
    /// With `exclude_customer` set, that customer's own holds are skipped.
    pub async fn live_overlapping(
        executor: impl PgExecutor<'_>,
        barber_id: DbId,
        window: &TimeWindow,
        now: Timestamp,
        exclude_customer: Option<DbId>,
    ) -> Result<Vec<AppointmentLock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointment_locks \
             WHERE barber_id = $1 \
               AND is_active AND expires_at > $2 \
               AND start_time < $4 AND end_time > $3 \
               AND ($5::BIGINT IS NULL OR customer_id <> $5) \
             ORDER BY start_time, id"
        );
        sqlx::query_as::<_, AppointmentLock>(&query)
            .bind(barber_id)
            .bind(now)
            .bind(window.start)
            .bind(window.end)
            .bind(exclude_customer)
            .fetch_all(executor)
            .await
    }

    /// Convert a checkout hold into a booking inside the caller's transaction.
    ///
    /// The lock must be live and match the customer, barber and exact
    /// window of the booking. It is deactivated on success.
    pub async fn consume(
        conn: &mut PgConnection,
        lock_id: DbId,
        customer_id: DbId,
        barber_id: DbId,
        window: &TimeWindow,
        now: Timestamp,
    ) -> Result<AppointmentLock, EngineError> {
        let query = format!("SELECT {COLUMNS} FROM appointment_locks WHERE id = $1 FOR UPDATE");
        let lock = sqlx::query_as::<_, AppointmentLock>(&query)
            .bind(lock_id)
            .fetch_optional(&mut *conn)
            .await?
            .filter(|l| l.is_live(now))
            .ok_or(SchedulingError::LockNotFound(lock_id))?;

        if lock.customer_id != customer_id {
            return Err(SchedulingError::LockMismatch("held by another customer".into()).into());
        }
        if lock.barber_id != barber_id {
            return Err(SchedulingError::LockMismatch("held for another barber".into()).into());
        }
        if lock.window() != *window {
            return Err(SchedulingError::LockMismatch(format!(
                "lock covers {} to {}, booking needs {} to {}",
                lock.start_time, lock.end_time, window.start, window.end
            ))
            .into());
        }

        sqlx::query("UPDATE appointment_locks SET is_active = FALSE WHERE id = $1")
            .bind(lock_id)
            .execute(&mut *conn)
            .await?;
        Ok(lock)
    }
}

//! Repository for the `unavailabilities` table (blackouts).

use chairbook_core::booking::SchedulingError;
use chairbook_core::types::DbId;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use validator::Validate;

use crate::error::EngineError;
use crate::models::calendar::{validate_time_pair, CreateUnavailability, Unavailability};
use crate::repositories::BarberRepo;

const COLUMNS: &str = "id, branch_id, barber_id, date, start_time, end_time, reason, created_at";

pub struct UnavailabilityRepo;

impl UnavailabilityRepo {
    /// Record a blackout for a branch, or for one barber when `barber_id` is set.
    pub async fn create(
        pool: &PgPool,
        branch_id: DbId,
        input: &CreateUnavailability,
    ) -> Result<Unavailability, EngineError> {
        input
            .validate()
            .map_err(|e| SchedulingError::InvalidInput(e.to_string()))?;
        validate_time_pair(false, input.start_time, input.end_time)
            .map_err(SchedulingError::InvalidInput)?;
        if let Some(barber_id) = input.barber_id {
            let barber = BarberRepo::find_by_id(pool, barber_id)
                .await?
                .ok_or(SchedulingError::BarberNotFound(barber_id))?;
            if barber.branch_id != branch_id {
                return Err(SchedulingError::BarberMismatch { barber_id, branch_id }.into());
            }
        }

        let query = format!(
            "INSERT INTO unavailabilities (branch_id, barber_id, date, start_time, end_time, reason) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Unavailability>(&query)
            .bind(branch_id)
            .bind(input.barber_id)
            .bind(input.date)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.reason)
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Unavailability>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM unavailabilities WHERE id = $1");
        sqlx::query_as::<_, Unavailability>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a blackout. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM unavailabilities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All blackouts of a branch (branch-wide and per-barber) in a date window.
    pub async fn list_by_branch(
        executor: impl PgExecutor<'_>,
        branch_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Unavailability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM unavailabilities \
             WHERE branch_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY date, start_time NULLS FIRST, id"
        );
        sqlx::query_as::<_, Unavailability>(&query)
            .bind(branch_id)
            .bind(from)
            .bind(to)
            .fetch_all(executor)
            .await
    }

    /// Blackouts that apply to one barber: branch-wide rows plus the
    /// barber's own. With `barber_id = None` only branch-wide rows match.
    pub async fn list_applicable(
        executor: impl PgExecutor<'_>,
        branch_id: DbId,
        barber_id: Option<DbId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Unavailability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM unavailabilities \
             WHERE branch_id = $1 AND date BETWEEN $3 AND $4 \
               AND (barber_id IS NULL OR barber_id = $2) \
             ORDER BY date, start_time NULLS FIRST, id"
        );
        sqlx::query_as::<_, Unavailability>(&query)
            .bind(branch_id)
            .bind(barber_id)
            .bind(from)
            .bind(to)
            .fetch_all(executor)
            .await
    }
}

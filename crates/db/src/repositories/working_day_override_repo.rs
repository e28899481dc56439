//! Repository for the `working_day_overrides` table.

use chairbook_core::booking::SchedulingError;
use chairbook_core::types::DbId;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use crate::error::EngineError;
use crate::models::calendar::{validate_time_pair, UpsertWorkingDayOverride, WorkingDayOverride};

const COLUMNS: &str = "id, branch_id, date, is_open, start_time, end_time, created_at, updated_at";

/// Date-specific exceptions that replace the weekly rule.
pub struct WorkingDayOverrideRepo;

impl WorkingDayOverrideRepo {
    /// Insert or replace the override for one branch date.
    pub async fn upsert(
        pool: &PgPool,
        branch_id: DbId,
        input: &UpsertWorkingDayOverride,
    ) -> Result<WorkingDayOverride, EngineError> {
        let (start, end) = if input.is_open {
            validate_time_pair(true, input.start_time, input.end_time)
                .map_err(SchedulingError::InvalidInput)?;
            (input.start_time, input.end_time)
        } else {
            (None, None)
        };

        let query = format!(
            "INSERT INTO working_day_overrides (branch_id, date, is_open, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_working_day_overrides_branch_date DO UPDATE SET \
                 is_open = EXCLUDED.is_open, \
                 start_time = EXCLUDED.start_time, \
                 end_time = EXCLUDED.end_time \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, WorkingDayOverride>(&query)
            .bind(branch_id)
            .bind(input.date)
            .bind(input.is_open)
            .bind(start)
            .bind(end)
            .fetch_one(pool)
            .await?;
        tracing::debug!(branch_id, date = %input.date, is_open = input.is_open, "Working day override set");
        Ok(row)
    }

    /// Remove the override for a date. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, branch_id: DbId, date: NaiveDate) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM working_day_overrides WHERE branch_id = $1 AND date = $2")
            .bind(branch_id)
            .bind(date)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List overrides within an inclusive date window, ordered by date.
    pub async fn list_by_branch(
        executor: impl PgExecutor<'_>,
        branch_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkingDayOverride>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM working_day_overrides \
             WHERE branch_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY date"
        );
        sqlx::query_as::<_, WorkingDayOverride>(&query)
            .bind(branch_id)
            .bind(from)
            .bind(to)
            .fetch_all(executor)
            .await
    }
}

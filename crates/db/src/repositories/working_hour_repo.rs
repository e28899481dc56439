//! Repository for the `working_hours` table.

use chairbook_core::booking::SchedulingError;
use chairbook_core::types::DbId;
use sqlx::{PgExecutor, PgPool};
use validator::Validate;

use crate::error::EngineError;
use crate::models::calendar::{validate_time_pair, UpsertWorkingHour, WorkingHour};

const COLUMNS: &str = "id, branch_id, weekday, is_open, start_time, end_time, created_at, updated_at";

/// Weekly opening rules, one row per (branch, weekday).
pub struct WorkingHourRepo;

impl WorkingHourRepo {
    /// Insert or replace the rule for one weekday of a branch.
    ///
    /// Closed days are stored without times.
    pub async fn upsert(
        pool: &PgPool,
        branch_id: DbId,
        input: &UpsertWorkingHour,
    ) -> Result<WorkingHour, EngineError> {
        input
            .validate()
            .map_err(|e| SchedulingError::InvalidInput(e.to_string()))?;
        let (start, end) = if input.is_open {
            validate_time_pair(true, input.start_time, input.end_time)
                .map_err(SchedulingError::InvalidInput)?;
            (input.start_time, input.end_time)
        } else {
            (None, None)
        };

        let query = format!(
            "INSERT INTO working_hours (branch_id, weekday, is_open, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_working_hours_branch_weekday DO UPDATE SET \
                 is_open = EXCLUDED.is_open, \
                 start_time = EXCLUDED.start_time, \
                 end_time = EXCLUDED.end_time \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, WorkingHour>(&query)
            .bind(branch_id)
            .bind(input.weekday)
            .bind(input.is_open)
            .bind(start)
            .bind(end)
            .fetch_one(pool)
            .await?;
        tracing::debug!(branch_id, weekday = input.weekday, is_open = input.is_open, "Working hours updated");
        Ok(row)
    }

    /// List a branch's weekly rules ordered by weekday (0 = Sunday).
    pub async fn list_by_branch(
        executor: impl PgExecutor<'_>,
        branch_id: DbId,
    ) -> Result<Vec<WorkingHour>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM working_hours WHERE branch_id = $1 ORDER BY weekday");
        sqlx::query_as::<_, WorkingHour>(&query)
            .bind(branch_id)
            .fetch_all(executor)
            .await
    }
}

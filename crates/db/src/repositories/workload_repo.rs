//! Repository for the `barber_workloads` rollup table.

use chairbook_core::appointment::workload_status_ids;
use chairbook_core::availability::day_window;
use chairbook_core::booking::TimeWindow;
use chairbook_core::types::{DbId, Timestamp};
use chairbook_core::workload::{tally, utilisation_percent, WorkloadTotals};
use chrono::NaiveDate;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::error::EngineError;
use crate::models::workload::{BarberWorkload, BranchWorkloadSummary};

const COLUMNS: &str = "id, barber_id, date, total_appointments, total_hours, created_at, updated_at";

/// Per-barber, per-day workload rollups.
pub struct WorkloadRepo;

impl WorkloadRepo {
    /// Insert or overwrite the totals for `(barber_id, date)`.
    ///
    /// Callers pass full recomputed totals, never deltas.
    pub async fn upsert(
        executor: impl PgExecutor<'_>,
        barber_id: DbId,
        date: NaiveDate,
        totals: WorkloadTotals,
    ) -> Result<BarberWorkload, sqlx::Error> {
        let query = format!(
            "INSERT INTO barber_workloads (barber_id, date, total_appointments, total_hours) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_barber_workloads_barber_date DO UPDATE SET \
                 total_appointments = EXCLUDED.total_appointments, \
                 total_hours = EXCLUDED.total_hours \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BarberWorkload>(&query)
            .bind(barber_id)
            .bind(date)
            .bind(totals.total_appointments)
            .bind(totals.total_hours)
            .fetch_one(executor)
            .await
    }

    /// Recompute a barber's totals for one UTC day from live appointments
    /// and write them.
    pub async fn recompute(
        conn: &mut PgConnection,
        barber_id: DbId,
        date: NaiveDate,
    ) -> Result<BarberWorkload, EngineError> {
        let day = day_window(date)?;
        let rows: Vec<(Timestamp, Timestamp)> = sqlx::query_as(
            "SELECT start_time, end_time FROM appointments \
             WHERE barber_id = $1 AND deleted_at IS NULL \
               AND status_id = ANY($2) \
               AND start_time >= $3 AND start_time < $4",
        )
        .bind(barber_id)
        .bind(workload_status_ids())
        .bind(day.start)
        .bind(day.end)
        .fetch_all(&mut *conn)
        .await?;

        let windows: Vec<TimeWindow> = rows
            .into_iter()
            .map(|(start, end)| TimeWindow { start, end })
            .collect();
        let totals = tally(&windows);
        let row = Self::upsert(&mut *conn, barber_id, date, totals).await?;
        tracing::debug!(
            barber_id,
            %date,
            total_appointments = totals.total_appointments,
            total_hours = totals.total_hours,
            "Barber workload recomputed"
        );
        Ok(row)
    }

    /// The stored rollup for one barber and day, if any booking touched it.
    pub async fn find_by_barber(
        pool: &PgPool,
        barber_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<BarberWorkload>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM barber_workloads WHERE barber_id = $1 AND date = $2");
        sqlx::query_as::<_, BarberWorkload>(&query)
            .bind(barber_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// Branch-level projection: barbers that worked versus registered barbers.
    pub async fn branch_summary(
        pool: &PgPool,
        tenant_id: DbId,
        branch_id: DbId,
        date: NaiveDate,
    ) -> Result<BranchWorkloadSummary, sqlx::Error> {
        let (total_barbers, worked_barbers, total_appointments, total_hours): (i64, i64, i64, f64) =
            sqlx::query_as(
                "SELECT \
                     COUNT(*), \
                     COUNT(*) FILTER (WHERE w.total_appointments > 0), \
                     COALESCE(SUM(w.total_appointments), 0)::BIGINT, \
                     COALESCE(SUM(w.total_hours), 0)::DOUBLE PRECISION \
                 FROM barbers b \
                 LEFT JOIN barber_workloads w ON w.barber_id = b.id AND w.date = $3 \
                 WHERE b.tenant_id = $1 AND b.branch_id = $2 AND b.deleted_at IS NULL",
            )
            .bind(tenant_id)
            .bind(branch_id)
            .bind(date)
            .fetch_one(pool)
            .await?;

        Ok(BranchWorkloadSummary {
            tenant_id,
            branch_id,
            date,
            worked_barbers,
            total_barbers,
            total_appointments,
            total_hours,
            utilisation_percent: utilisation_percent(worked_barbers, total_barbers),
        })
    }
}

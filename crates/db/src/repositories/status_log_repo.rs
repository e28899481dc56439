//! Repository for the append-only `appointment_status_logs` table.

use chairbook_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::status_log::{AppointmentStatusLog, StatusChange};

const COLUMNS: &str = "id, appointment_id, old_status_id, new_status_id, changed_at, \
    changed_by_user_id, changed_by_customer_id, notes";

/// Audit trail of appointment status transitions. Rows are never updated.
pub struct StatusLogRepo;

impl StatusLogRepo {
    /// Append one transition inside the caller's transaction.
    ///
    /// `changed_at` never precedes the appointment's latest entry, so the
    /// log stays ordered even when several transitions share a transaction.
    pub async fn log_status_change(
        conn: &mut PgConnection,
        change: &StatusChange<'_>,
    ) -> Result<AppointmentStatusLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO appointment_status_logs \
                 (appointment_id, old_status_id, new_status_id, changed_at, \
                  changed_by_user_id, changed_by_customer_id, notes) \
             VALUES ($1, $2, $3, \
                     GREATEST(clock_timestamp(), \
                              (SELECT MAX(changed_at) FROM appointment_status_logs \
                               WHERE appointment_id = $1)), \
                     $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppointmentStatusLog>(&query)
            .bind(change.appointment_id)
            .bind(change.old_status.map(|s| s.id()))
            .bind(change.new_status.id())
            .bind(change.actor.user_id())
            .bind(change.actor.customer_id())
            .bind(change.notes)
            .fetch_one(conn)
            .await
    }

    /// All transitions of an appointment, oldest first.
    pub async fn list_by_appointment(
        pool: &PgPool,
        appointment_id: DbId,
    ) -> Result<Vec<AppointmentStatusLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointment_status_logs \
             WHERE appointment_id = $1 \
             ORDER BY changed_at ASC, id ASC"
        );
        sqlx::query_as::<_, AppointmentStatusLog>(&query)
            .bind(appointment_id)
            .fetch_all(pool)
            .await
    }

    /// Remove an appointment's history. Only used when the appointment
    /// itself is purged.
    pub async fn delete_by_appointment(
        conn: &mut PgConnection,
        appointment_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointment_status_logs WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

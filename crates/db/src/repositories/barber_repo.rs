//! Repository for the `barbers` table.

use chairbook_core::appointment::blocking_status_ids;
use chairbook_core::booking::TimeWindow;
use chairbook_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::barber::Barber;

/// Column list for barbers queries.
const COLUMNS: &str = "id, tenant_id, branch_id, user_id, display_name, is_active, \
    created_at, updated_at";

/// Read access to barbers plus the per-barber serialisation lock.
pub struct BarberRepo;

impl BarberRepo {
    /// Find a live (non-deleted) barber by ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Barber>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM barbers WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Barber>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock a barber row for the rest of the enclosing transaction.
    ///
    /// Every write that checks and then changes a barber's calendar takes
    /// this lock first, so concurrent writers for the same barber run one
    /// after another while other barbers proceed in parallel. `NO KEY`
    /// strength leaves foreign-key inserts referencing the row unblocked.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Barber>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM barbers \
             WHERE id = $1 AND deleted_at IS NULL \
             FOR NO KEY UPDATE"
        );
        sqlx::query_as::<_, Barber>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Active barbers of a branch with no PENDING/CONFIRMED appointment
    /// overlapping `window`. Locks are not considered.
    pub async fn list_free(
        executor: impl PgExecutor<'_>,
        branch_id: DbId,
        window: &TimeWindow,
    ) -> Result<Vec<Barber>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM barbers b \
             WHERE b.branch_id = $1 AND b.is_active AND b.deleted_at IS NULL \
               AND NOT EXISTS ( \
                   SELECT 1 FROM appointments a \
                   WHERE a.barber_id = b.id AND a.deleted_at IS NULL \
                     AND a.status_id = ANY($2) \
                     AND a.start_time < $4 AND a.end_time > $3 \
               ) \
             ORDER BY b.id"
        );
        sqlx::query_as::<_, Barber>(&query)
            .bind(branch_id)
            .bind(blocking_status_ids())
            .bind(window.start)
            .bind(window.end)
            .fetch_all(executor)
            .await
    }
}

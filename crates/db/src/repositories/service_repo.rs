//! Repository for the `services` table.

use chairbook_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::service::Service;

const COLUMNS: &str = "id, tenant_id, branch_id, name, duration_mins, price_cents, \
    created_at, updated_at, deleted_at";

pub struct ServiceRepo;

impl ServiceRepo {
    /// Find a live (non-deleted) service by ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Service>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

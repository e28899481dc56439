//! Existence checks against the `customers` collaborator table.

use chairbook_core::types::DbId;
use sqlx::PgExecutor;

pub struct CustomerRepo;

impl CustomerRepo {
    /// Whether a live customer exists within the tenant.
    pub async fn exists_in_tenant(
        executor: impl PgExecutor<'_>,
        tenant_id: DbId,
        customer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM customers \
                 WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL \
             )",
        )
        .bind(customer_id)
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }
}

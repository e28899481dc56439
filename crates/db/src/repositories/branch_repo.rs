//! Repository for the `branches` table.

use chairbook_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::branch::Branch;

const COLUMNS: &str = "id, tenant_id, name, created_at, updated_at";

pub struct BranchRepo;

impl BranchRepo {
    /// Find a live branch, scoped to its tenant.
    pub async fn find_for_tenant(
        executor: impl PgExecutor<'_>,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Branch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM branches \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Branch>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await
    }

    /// Find a live branch by ID regardless of tenant.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Branch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branches WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Branch>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

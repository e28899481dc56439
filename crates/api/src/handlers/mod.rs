//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: they resolve the caller's tenant, check ownership and
//! delegate to the repositories in `chairbook_db`.

pub mod appointments;
pub mod availability;
pub mod calendar;
pub mod locks;
pub mod workload;

use chairbook_core::booking::SchedulingError;
use chairbook_core::types::DbId;
use chairbook_db::models::barber::Barber;
use chairbook_db::models::branch::Branch;
use chairbook_db::repositories::{BarberRepo, BranchRepo};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// Load a branch of the caller's tenant. Other tenants' branches are
/// reported as not found.
async fn branch_in_tenant(pool: &PgPool, auth: &AuthUser, branch_id: DbId) -> AppResult<Branch> {
    let branch = BranchRepo::find_for_tenant(pool, auth.tenant_id, branch_id)
        .await?
        .ok_or(SchedulingError::BranchNotFound(branch_id))?;
    Ok(branch)
}

/// Load a barber of the caller's tenant.
async fn barber_in_tenant(pool: &PgPool, auth: &AuthUser, barber_id: DbId) -> AppResult<Barber> {
    let barber = BarberRepo::find_by_id(pool, barber_id)
        .await?
        .filter(|b| b.tenant_id == auth.tenant_id)
        .ok_or(SchedulingError::BarberNotFound(barber_id))?;
    Ok(barber)
}

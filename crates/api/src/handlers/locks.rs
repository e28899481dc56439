//! Handlers for checkout locks (`/appointment-locks`).
//!
//! Customers hold and release their own locks; staff may act on behalf of
//! any customer of their tenant.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chairbook_core::booking::SchedulingError;
use chairbook_core::error::CoreError;
use chairbook_core::types::DbId;
use chairbook_db::models::appointment_lock::{
    AppointmentLock, AppointmentLockListQuery, CreateAppointmentLock,
};
use chairbook_db::repositories::AppointmentLockRepo;
use chrono::Utc;

use super::branch_in_tenant;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch a lock visible to the caller.
///
/// Locks of other tenants, and other customers' locks when the caller is a
/// customer, are reported as not found.
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    lock_id: DbId,
    auth: &AuthUser,
) -> AppResult<AppointmentLock> {
    let lock = AppointmentLockRepo::find_by_id(pool, lock_id)
        .await?
        .filter(|l| l.tenant_id == auth.tenant_id && auth.may_act_for_customer(l.customer_id))
        .ok_or(SchedulingError::LockNotFound(lock_id))?;
    Ok(lock)
}

/// POST /api/v1/appointment-locks
///
/// Holds the window for the configured lock duration. Returns 201, or 409
/// with `SLOT_TAKEN` / `SLOT_LOCKED` when the window is not free.
pub async fn create_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAppointmentLock>,
) -> AppResult<impl IntoResponse> {
    auth.scope_tenant(Some(input.tenant_id))?;
    if !auth.may_act_for_customer(input.customer_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot hold a slot for another customer".into(),
        )));
    }

    let lock =
        AppointmentLockRepo::create(&state.pool, &input, state.config.scheduling.lock_hold())
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lock })))
}

/// GET /api/v1/appointment-locks?branch_id&barber_id&date
///
/// Live locks only, ordered by start time. Staff only.
pub async fn list_locks(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<AppointmentLockListQuery>,
) -> AppResult<impl IntoResponse> {
    branch_in_tenant(&state.pool, &auth, params.branch_id).await?;
    let locks = AppointmentLockRepo::list_active(
        &state.pool,
        params.branch_id,
        params.barber_id,
        params.date,
        Utc::now(),
    )
    .await?;
    Ok(Json(DataResponse { data: locks }))
}

/// GET /api/v1/appointment-locks/{id}
pub async fn get_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(lock_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let lock = find_and_authorize(&state.pool, lock_id, &auth).await?;
    Ok(Json(DataResponse { data: lock }))
}

/// DELETE /api/v1/appointment-locks/{id}
///
/// Releases an active lock. Returns 204, or 404 if it is unknown or
/// already inactive.
pub async fn release_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(lock_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, lock_id, &auth).await?;
    AppointmentLockRepo::release(&state.pool, lock_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Handlers for the `/appointments` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Customers see and
//! change only their own appointments; staff act on any appointment of their
//! tenant. Explicit status changes and deletion are staff-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chairbook_core::booking::SchedulingError;
use chairbook_core::error::CoreError;
use chairbook_core::roles::ROLE_ADMIN;
use chairbook_core::types::DbId;
use chairbook_db::models::appointment::{
    Appointment, AppointmentListQuery, AppointmentPatch, CancelAppointment, CreateAppointment,
    RescheduleAppointment, UpdateAppointmentStatus,
};
use chairbook_db::repositories::{AppointmentRepo, StatusLogRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a live appointment the caller may see.
///
/// Appointments of other tenants or, for customers, of other customers are
/// reported as not found.
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    appointment_id: DbId,
    auth: &AuthUser,
) -> AppResult<Appointment> {
    let appointment = AppointmentRepo::find_by_id(pool, appointment_id)
        .await?
        .filter(|a| visible_to(a, auth))
        .ok_or(SchedulingError::AppointmentNotFound(appointment_id))?;
    Ok(appointment)
}

fn visible_to(appointment: &Appointment, auth: &AuthUser) -> bool {
    appointment.tenant_id == auth.tenant_id && auth.may_act_for_customer(appointment.customer_id)
}

fn forbidden(msg: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(msg.into()))
}

// ---------------------------------------------------------------------------
// Create / list / get
// ---------------------------------------------------------------------------

/// POST /api/v1/appointments
///
/// Books in PENDING. `tenant_id` defaults to the caller's tenant and, for
/// customers, `customer_id` to the caller. Returns 201, or 409 with
/// `SLOT_UNAVAILABLE` / `SLOT_LOCKED` when the barber is not free.
pub async fn create_appointment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateAppointment>,
) -> AppResult<impl IntoResponse> {
    input.tenant_id = Some(auth.scope_tenant(input.tenant_id)?);
    if let Some(own) = auth.customer_id() {
        match input.customer_id {
            None => input.customer_id = Some(own),
            Some(other) if other != own => {
                return Err(forbidden("Cannot book for another customer"));
            }
            Some(_) => {}
        }
    }

    let appointment = AppointmentRepo::create(&state.pool, &input, auth.actor()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: appointment })))
}

/// GET /api/v1/appointments
///
/// Filters by branch, barber, customer, status and start window; paginated
/// with `limit` (default 50, max 100) and `offset`. Customers only ever see
/// their own appointments and never tombstoned ones.
pub async fn list_appointments(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(mut params): Query<AppointmentListQuery>,
) -> AppResult<impl IntoResponse> {
    params.tenant_id = Some(auth.scope_tenant(params.tenant_id)?);
    if let Some(own) = auth.customer_id() {
        if params.customer_id.is_some_and(|c| c != own) {
            return Err(forbidden("Cannot list another customer's appointments"));
        }
        params.customer_id = Some(own);
        params.include_deleted = false;
    }

    let appointments = AppointmentRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: appointments }))
}

/// GET /api/v1/appointments/{id}
pub async fn get_appointment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(appointment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let appointment = find_and_authorize(&state.pool, appointment_id, &auth).await?;
    Ok(Json(DataResponse { data: appointment }))
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// PATCH /api/v1/appointments/{id}
///
/// Only `notes` is patchable; `null` clears it. Unknown fields are 422.
pub async fn update_appointment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(appointment_id): Path<DbId>,
    Json(patch): Json<AppointmentPatch>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, appointment_id, &auth).await?;
    let appointment = AppointmentRepo::update_details(&state.pool, appointment_id, &patch).await?;
    Ok(Json(DataResponse { data: appointment }))
}

/// POST /api/v1/appointments/{id}/reschedule
///
/// Returns the new PENDING appointment; the original becomes RESCHEDULED.
pub async fn reschedule_appointment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(appointment_id): Path<DbId>,
    Json(input): Json<RescheduleAppointment>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, appointment_id, &auth).await?;
    let appointment =
        AppointmentRepo::reschedule(&state.pool, appointment_id, &input, auth.actor()).await?;
    Ok(Json(DataResponse { data: appointment }))
}

/// POST /api/v1/appointments/{id}/cancel
///
/// The body (`{"reason": ...}`) is optional.
pub async fn cancel_appointment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(appointment_id): Path<DbId>,
    body: Option<Json<CancelAppointment>>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, appointment_id, &auth).await?;
    let reason = body.and_then(|Json(b)| b.reason);
    let appointment =
        AppointmentRepo::cancel(&state.pool, appointment_id, auth.actor(), reason.as_deref())
            .await?;
    Ok(Json(DataResponse { data: appointment }))
}

/// PUT /api/v1/appointments/{id}/status
///
/// Staff-only state-machine transition (confirm, complete, no-show, cancel).
pub async fn update_status(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(appointment_id): Path<DbId>,
    Json(input): Json<UpdateAppointmentStatus>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, appointment_id, &auth).await?;
    let appointment = AppointmentRepo::update_status(
        &state.pool,
        appointment_id,
        input.status,
        auth.actor(),
        input.notes.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse { data: appointment }))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    /// Hard-delete the row and its status history (admin only).
    #[serde(default)]
    pub purge: bool,
}

/// DELETE /api/v1/appointments/{id}
///
/// Soft-deletes by default. `?purge=true` removes the row and its status
/// logs permanently, including already soft-deleted rows.
pub async fn delete_appointment(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(appointment_id): Path<DbId>,
    Query(params): Query<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    let not_found = || AppError::Scheduling(SchedulingError::AppointmentNotFound(appointment_id));

    let deleted = if params.purge {
        if !auth.has_role(ROLE_ADMIN) {
            return Err(forbidden("Admin role required to purge"));
        }
        AppointmentRepo::find_including_deleted(&state.pool, appointment_id)
            .await?
            .filter(|a| a.tenant_id == auth.tenant_id)
            .ok_or_else(not_found)?;
        AppointmentRepo::purge(&state.pool, appointment_id).await?
    } else {
        find_and_authorize(&state.pool, appointment_id, &auth).await?;
        AppointmentRepo::soft_delete(&state.pool, appointment_id).await?
    };

    if !deleted {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments/{id}/status-logs
///
/// Transitions in the order they happened.
pub async fn list_status_logs(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(appointment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, appointment_id, &auth).await?;
    let logs = StatusLogRepo::list_by_appointment(&state.pool, appointment_id).await?;
    Ok(Json(DataResponse { data: logs }))
}

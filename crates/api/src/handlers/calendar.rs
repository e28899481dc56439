//! Handlers for branch calendar rules: working hours, date overrides and
//! unavailabilities.
//!
//! Reads are open to any caller of the branch's tenant; writes require
//! [`RequireCalendarManager`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chairbook_core::availability::DateRange;
use chairbook_core::error::CoreError;
use chairbook_core::types::DbId;
use chairbook_db::models::calendar::{
    CreateUnavailability, DateRangeQuery, UpsertWorkingDayOverride, UpsertWorkingHour,
};
use chairbook_db::repositories::{UnavailabilityRepo, WorkingDayOverrideRepo, WorkingHourRepo};
use chrono::NaiveDate;

use super::branch_in_tenant;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCalendarManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest window accepted by calendar listings.
const MAX_LISTING_DAYS: i64 = 366;

fn listing_range(params: &DateRangeQuery) -> AppResult<DateRange> {
    Ok(DateRange::new(params.from, params.to, MAX_LISTING_DAYS)?)
}

// ---------------------------------------------------------------------------
// Working hours
// ---------------------------------------------------------------------------

/// GET /api/v1/branches/{id}/working-hours
pub async fn list_working_hours(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let rows = WorkingHourRepo::list_by_branch(&state.pool, branch_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// PUT /api/v1/branches/{id}/working-hours
///
/// Upserts one weekday. Closed days carry no times.
pub async fn upsert_working_hour(
    RequireCalendarManager(auth): RequireCalendarManager,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Json(input): Json<UpsertWorkingHour>,
) -> AppResult<impl IntoResponse> {
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let row = WorkingHourRepo::upsert(&state.pool, branch_id, &input).await?;

    tracing::info!(
        branch_id,
        weekday = row.weekday,
        is_open = row.is_open,
        user_id = auth.id,
        "Working hours updated"
    );
    Ok(Json(DataResponse { data: row }))
}

// ---------------------------------------------------------------------------
// Working-day overrides
// ---------------------------------------------------------------------------

/// GET /api/v1/branches/{id}/working-day-overrides?from&to
pub async fn list_overrides(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Query(params): Query<DateRangeQuery>,
) -> AppResult<impl IntoResponse> {
    let range = listing_range(&params)?;
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let rows =
        WorkingDayOverrideRepo::list_by_branch(&state.pool, branch_id, range.from, range.to)
            .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// PUT /api/v1/branches/{id}/working-day-overrides
pub async fn upsert_override(
    RequireCalendarManager(auth): RequireCalendarManager,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Json(input): Json<UpsertWorkingDayOverride>,
) -> AppResult<impl IntoResponse> {
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let row = WorkingDayOverrideRepo::upsert(&state.pool, branch_id, &input).await?;

    tracing::info!(
        branch_id,
        date = %row.date,
        is_open = row.is_open,
        user_id = auth.id,
        "Working day override set"
    );
    Ok(Json(DataResponse { data: row }))
}

/// DELETE /api/v1/branches/{id}/working-day-overrides/{date}
///
/// Idempotent: returns 204 whether or not an override existed.
pub async fn delete_override(
    RequireCalendarManager(auth): RequireCalendarManager,
    State(state): State<AppState>,
    Path((branch_id, date)): Path<(DbId, NaiveDate)>,
) -> AppResult<impl IntoResponse> {
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let deleted = WorkingDayOverrideRepo::delete(&state.pool, branch_id, date).await?;
    tracing::info!(branch_id, %date, deleted, user_id = auth.id, "Working day override removed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Unavailabilities
// ---------------------------------------------------------------------------

/// GET /api/v1/branches/{id}/unavailabilities?from&to
pub async fn list_unavailabilities(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Query(params): Query<DateRangeQuery>,
) -> AppResult<impl IntoResponse> {
    let range = listing_range(&params)?;
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let rows =
        UnavailabilityRepo::list_by_branch(&state.pool, branch_id, range.from, range.to).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/branches/{id}/unavailabilities
///
/// Without `barber_id` the blackout covers the whole branch; without times
/// it covers the whole day.
pub async fn create_unavailability(
    RequireCalendarManager(auth): RequireCalendarManager,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Json(input): Json<CreateUnavailability>,
) -> AppResult<impl IntoResponse> {
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let row = UnavailabilityRepo::create(&state.pool, branch_id, &input).await?;

    tracing::info!(
        unavailability_id = row.id,
        branch_id,
        barber_id = ?row.barber_id,
        date = %row.date,
        user_id = auth.id,
        "Unavailability created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

/// DELETE /api/v1/unavailabilities/{id}
pub async fn delete_unavailability(
    RequireCalendarManager(auth): RequireCalendarManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Unavailability",
            id,
        })
    };
    let row = UnavailabilityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    // Rows of other tenants are indistinguishable from missing ones.
    branch_in_tenant(&state.pool, &auth, row.branch_id)
        .await
        .map_err(|_| not_found())?;

    if !UnavailabilityRepo::delete(&state.pool, id).await? {
        return Err(not_found());
    }
    tracing::info!(unavailability_id = id, user_id = auth.id, "Unavailability deleted");
    Ok(StatusCode::NO_CONTENT)
}

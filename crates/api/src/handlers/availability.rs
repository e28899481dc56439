//! Read-only availability queries: slot grids, free barbers and point checks.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chairbook_core::availability::DateRange;
use chairbook_core::types::{DbId, Timestamp};
use chairbook_db::repositories::{AppointmentRepo, AvailabilityRepo};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{barber_in_tenant, branch_in_tenant};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for slot listings.
#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    /// Defaults to the caller's tenant.
    pub tenant_id: Option<DbId>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Overrides the configured slot length.
    pub granularity_mins: Option<i64>,
}

/// A `[start, end)` window in query parameters.
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct BarberAvailability {
    pub barber_id: DbId,
    pub start: Timestamp,
    pub end: Timestamp,
    pub available: bool,
}

/// GET /api/v1/branches/{id}/slots?tenant_id&from&to
///
/// Operating-hour capacity of the branch, minus branch-wide blackouts.
/// Bookings and locks are not subtracted here; use the barber slot view.
pub async fn branch_slots(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Query(params): Query<SlotQuery>,
) -> AppResult<impl IntoResponse> {
    let tenant_id = auth.scope_tenant(params.tenant_id)?;
    let scheduling = &state.config.scheduling;
    let range = DateRange::new(params.from, params.to, scheduling.max_availability_range_days)?;
    let step = scheduling.slot_step(params.granularity_mins)?;

    let slots = AvailabilityRepo::branch_slots(&state.pool, tenant_id, branch_id, &range, step)
        .await?;
    Ok(Json(DataResponse { data: slots }))
}

/// GET /api/v1/barbers/{id}/slots?from&to
///
/// Every capacity slot labelled for the barber. A customer caller sees their
/// own checkout locks as available.
pub async fn barber_slots(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(barber_id): Path<DbId>,
    Query(params): Query<SlotQuery>,
) -> AppResult<impl IntoResponse> {
    let scheduling = &state.config.scheduling;
    let range = DateRange::new(params.from, params.to, scheduling.max_availability_range_days)?;
    let step = scheduling.slot_step(params.granularity_mins)?;
    barber_in_tenant(&state.pool, &auth, barber_id).await?;

    let slots = AvailabilityRepo::barber_slots(
        &state.pool,
        barber_id,
        &range,
        step,
        auth.customer_id(),
        Utc::now(),
    )
    .await?;
    Ok(Json(DataResponse { data: slots }))
}

/// GET /api/v1/branches/{id}/available-barbers?start&end
pub async fn available_barbers(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Query(params): Query<WindowQuery>,
) -> AppResult<impl IntoResponse> {
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let barbers =
        AppointmentRepo::available_barbers(&state.pool, branch_id, params.start, params.end)
            .await?;
    Ok(Json(DataResponse { data: barbers }))
}

/// GET /api/v1/barbers/{id}/availability?start&end
pub async fn barber_availability(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(barber_id): Path<DbId>,
    Query(params): Query<WindowQuery>,
) -> AppResult<impl IntoResponse> {
    barber_in_tenant(&state.pool, &auth, barber_id).await?;
    let available = AppointmentRepo::check_barber_availability(
        &state.pool,
        barber_id,
        params.start,
        params.end,
    )
    .await?;

    Ok(Json(DataResponse {
        data: BarberAvailability {
            barber_id,
            start: params.start,
            end: params.end,
            available,
        },
    }))
}

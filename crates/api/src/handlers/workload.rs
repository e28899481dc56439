//! Workload views for staff.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chairbook_core::types::DbId;
use chairbook_db::models::workload::WorkloadQuery;
use chairbook_db::repositories::WorkloadRepo;
use chrono::NaiveDate;
use serde::Serialize;

use super::{barber_in_tenant, branch_in_tenant};
use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// One barber's totals for a day. Days without bookings report zeros.
#[derive(Debug, Serialize)]
pub struct BarberDayWorkload {
    pub barber_id: DbId,
    pub date: NaiveDate,
    pub total_appointments: i32,
    pub total_hours: f64,
}

/// GET /api/v1/barbers/{id}/workload?date
pub async fn barber_workload(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(barber_id): Path<DbId>,
    Query(params): Query<WorkloadQuery>,
) -> AppResult<impl IntoResponse> {
    barber_in_tenant(&state.pool, &auth, barber_id).await?;
    let row = WorkloadRepo::find_by_barber(&state.pool, barber_id, params.date).await?;

    let data = BarberDayWorkload {
        barber_id,
        date: params.date,
        total_appointments: row.as_ref().map_or(0, |w| w.total_appointments),
        total_hours: row.as_ref().map_or(0.0, |w| w.total_hours),
    };
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/branches/{id}/workload-summary?tenant_id&date
pub async fn branch_summary(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Query(params): Query<WorkloadQuery>,
) -> AppResult<impl IntoResponse> {
    let tenant_id = auth.scope_tenant(params.tenant_id)?;
    branch_in_tenant(&state.pool, &auth, branch_id).await?;
    let summary =
        WorkloadRepo::branch_summary(&state.pool, tenant_id, branch_id, params.date).await?;
    Ok(Json(DataResponse { data: summary }))
}

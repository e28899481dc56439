//! Route definitions for the `/branches` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{availability, calendar, workload};
use crate::state::AppState;

/// Routes mounted at `/branches`.
///
/// ```text
/// GET         /{id}/slots                          -> branch_slots
/// GET         /{id}/available-barbers              -> available_barbers
/// GET         /{id}/workload-summary               -> branch_summary (staff)
/// GET, PUT    /{id}/working-hours                  -> list / upsert (calendar manager)
/// GET, PUT    /{id}/working-day-overrides          -> list / upsert (calendar manager)
/// DELETE      /{id}/working-day-overrides/{date}   -> delete_override (calendar manager)
/// GET, POST   /{id}/unavailabilities               -> list / create (calendar manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/slots", get(availability::branch_slots))
        .route("/{id}/available-barbers", get(availability::available_barbers))
        .route("/{id}/workload-summary", get(workload::branch_summary))
        .route(
            "/{id}/working-hours",
            get(calendar::list_working_hours).put(calendar::upsert_working_hour),
        )
        .route(
            "/{id}/working-day-overrides",
            get(calendar::list_overrides).put(calendar::upsert_override),
        )
        .route(
            "/{id}/working-day-overrides/{date}",
            delete(calendar::delete_override),
        )
        .route(
            "/{id}/unavailabilities",
            get(calendar::list_unavailabilities).post(calendar::create_unavailability),
        )
}

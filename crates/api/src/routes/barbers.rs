//! Route definitions for the `/barbers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{availability, workload};
use crate::state::AppState;

/// Routes mounted at `/barbers`.
///
/// ```text
/// GET    /{id}/slots          -> barber_slots
/// GET    /{id}/availability   -> barber_availability
/// GET    /{id}/workload       -> barber_workload (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/slots", get(availability::barber_slots))
        .route("/{id}/availability", get(availability::barber_availability))
        .route("/{id}/workload", get(workload::barber_workload))
}

//! Route definitions for the `/appointments` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::appointments;
use crate::state::AppState;

/// Routes mounted at `/appointments`.
///
/// ```text
/// GET    /                  -> list_appointments
/// POST   /                  -> create_appointment
/// GET    /{id}              -> get_appointment
/// PATCH  /{id}              -> update_appointment
/// DELETE /{id}              -> delete_appointment (staff; ?purge=true admin)
/// POST   /{id}/reschedule   -> reschedule_appointment
/// POST   /{id}/cancel       -> cancel_appointment
/// PUT    /{id}/status       -> update_status (staff)
/// GET    /{id}/status-logs  -> list_status_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/{id}",
            get(appointments::get_appointment)
                .patch(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route("/{id}/reschedule", post(appointments::reschedule_appointment))
        .route("/{id}/cancel", post(appointments::cancel_appointment))
        .route("/{id}/status", put(appointments::update_status))
        .route("/{id}/status-logs", get(appointments::list_status_logs))
}

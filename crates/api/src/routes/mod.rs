pub mod appointment_locks;
pub mod appointments;
pub mod barbers;
pub mod branches;
pub mod health;
pub mod unavailabilities;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /branches/{id}/slots                              capacity slots (GET)
/// /branches/{id}/available-barbers                  free barbers for a window (GET)
/// /branches/{id}/workload-summary                   daily utilisation (GET, staff)
/// /branches/{id}/working-hours                      list, upsert (GET, PUT)
/// /branches/{id}/working-day-overrides              list, upsert (GET, PUT)
/// /branches/{id}/working-day-overrides/{date}       remove (DELETE)
/// /branches/{id}/unavailabilities                   list, create (GET, POST)
///
/// /unavailabilities/{id}                            remove (DELETE)
///
/// /barbers/{id}/slots                               labelled slots (GET)
/// /barbers/{id}/availability                        point check (GET)
/// /barbers/{id}/workload                            daily totals (GET, staff)
///
/// /appointment-locks                                list, create (GET, POST)
/// /appointment-locks/{id}                           get, release (GET, DELETE)
///
/// /appointments                                     list, create (GET, POST)
/// /appointments/{id}                                get, patch, delete
/// /appointments/{id}/reschedule                     reschedule (POST)
/// /appointments/{id}/cancel                         cancel (POST)
/// /appointments/{id}/status                         transition (PUT, staff)
/// /appointments/{id}/status-logs                    history (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/branches", branches::router())
        .nest("/barbers", barbers::router())
        .nest("/unavailabilities", unavailabilities::router())
        .nest("/appointment-locks", appointment_locks::router())
        .nest("/appointments", appointments::router())
}

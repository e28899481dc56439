//! Route definitions for the `/unavailabilities` resource.

use axum::routing::delete;
use axum::Router;

use crate::handlers::calendar;
use crate::state::AppState;

/// Routes mounted at `/unavailabilities`.
///
/// ```text
/// DELETE /{id}   -> delete_unavailability (calendar manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(calendar::delete_unavailability))
}

//! Route definitions for the `/appointment-locks` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::locks;
use crate::state::AppState;

/// Routes mounted at `/appointment-locks`.
///
/// ```text
/// GET    /        -> list_locks (staff)
/// POST   /        -> create_lock
/// GET    /{id}    -> get_lock
/// DELETE /{id}    -> release_lock
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(locks::list_locks).post(locks::create_lock))
        .route("/{id}", get(locks::get_lock).delete(locks::release_lock))
}

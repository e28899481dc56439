use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chairbook_core::booking::SchedulingError;
use chairbook_core::error::CoreError;
use chairbook_db::EngineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for generic failures and [`SchedulingError`] for the
/// booking domain, plus HTTP-specific variants. Implements [`IntoResponse`]
/// to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A generic domain error from `chairbook_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A scheduling failure (slot taken, invalid transition, ...).
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Scheduling(e) => AppError::Scheduling(e),
            EngineError::Database(e) => AppError::Database(e),
        }
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Scheduling errors ---
            AppError::Scheduling(err) => {
                let (status, code) = classify_scheduling_error(err);
                (status, code, err.to_string())
            }

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a scheduling failure to an HTTP status and stable error code.
///
/// Slot contention is 409 so clients can refresh availability and retry;
/// a barber outside the requested branch is 422.
fn classify_scheduling_error(err: &SchedulingError) -> (StatusCode, &'static str) {
    match err {
        SchedulingError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        SchedulingError::InvalidStateTransition { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_STATE_TRANSITION")
        }
        SchedulingError::BranchNotFound(_) => (StatusCode::NOT_FOUND, "BRANCH_NOT_FOUND"),
        SchedulingError::ServiceNotFound(_) => (StatusCode::NOT_FOUND, "SERVICE_NOT_FOUND"),
        SchedulingError::BarberNotFound(_) => (StatusCode::NOT_FOUND, "BARBER_NOT_FOUND"),
        SchedulingError::AppointmentNotFound(_) => {
            (StatusCode::NOT_FOUND, "APPOINTMENT_NOT_FOUND")
        }
        SchedulingError::LockNotFound(_) => (StatusCode::NOT_FOUND, "LOCK_NOT_FOUND"),
        SchedulingError::BarberMismatch { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "BARBER_MISMATCH")
        }
        SchedulingError::SlotUnavailable => (StatusCode::CONFLICT, "SLOT_UNAVAILABLE"),
        SchedulingError::SlotTaken => (StatusCode::CONFLICT, "SLOT_TAKEN"),
        SchedulingError::SlotLocked => (StatusCode::CONFLICT, "SLOT_LOCKED"),
        SchedulingError::LockMismatch(_) => (StatusCode::CONFLICT, "LOCK_MISMATCH"),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

use chairbook_core::booking::SchedulingError;

/// Name of the exclusion constraint guarding barber calendars.
pub const APPOINTMENT_OVERLAP_CONSTRAINT: &str = "ex_appointments_barber_overlap";

/// PostgreSQL SQLSTATE for `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Error returned by transactional scheduling operations.
///
/// Domain failures are surfaced verbatim; anything else is a storage error
/// and the enclosing transaction has already been rolled back (dropped).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    /// The domain error, if this is one.
    pub fn as_scheduling(&self) -> Option<&SchedulingError> {
        match self {
            EngineError::Scheduling(err) => Some(err),
            EngineError::Database(_) => None,
        }
    }
}

/// Translate an overlap rejected by the database constraint into the same
/// error the in-transaction check produces.
pub(crate) fn classify_insert_error(err: sqlx::Error) -> EngineError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION)
            && db_err.constraint() == Some(APPOINTMENT_OVERLAP_CONSTRAINT)
        {
            return EngineError::Scheduling(SchedulingError::SlotUnavailable);
        }
    }
    EngineError::Database(err)
}

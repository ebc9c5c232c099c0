use thiserror::Error;

/// Failure taxonomy for engine operations. Every operation is all-or-nothing;
/// an error means no state changed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or out-of-range input, rejected before anything is written.
    #[error("{0}")]
    Validation(String),

    /// The actor lacks rights over the target resource.
    #[error("{0}")]
    Authorization(String),

    /// The referenced id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule is already satisfied by existing state.
    #[error("{0}")]
    Conflict(String),

    /// The actor's rate limit for this operation is exhausted.
    #[error("{0}")]
    QuotaExceeded(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// True when a rusqlite error is a UNIQUE constraint violation on the
    /// named column list, e.g. `"messages.dating_post_id"`.
    pub(crate) fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, Some(msg))
                if e.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains(column)
        )
    }
}

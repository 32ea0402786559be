//! Error types for the student repository.
//!
//! Every failure the repository can report falls into one of three kinds:
//! a bad argument caught before any storage call, a uniqueness conflict
//! reported by storage, or a storage fault (including timeouts). A missing
//! record is not an error at all; lookups return `Option` and mutations
//! return `bool`.
//!
//! Display strings never include SQL text or the database location. The
//! underlying `rusqlite` error stays reachable through `source()`.

use rusqlite::ffi;
use thiserror::Error;

/// Coarse classification callers can match on without caring about detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Conflict,
    Storage,
}

#[derive(Error, Debug)]
pub enum RosterError {
    /// A caller-supplied value failed a structural or business rule.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The write would break a uniqueness rule (duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other database fault.
    #[error("storage error: {}", describe(.0))]
    Storage(#[source] rusqlite::Error),

    /// The caller's deadline passed before the operation finished.
    #[error("storage error: operation timed out")]
    Timeout,

    /// A blocking repository call panicked or was cancelled on the worker pool.
    #[error("storage error: background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),

    /// A bulk insert was rolled back. `inserted` is how many records had gone
    /// in before the failing one.
    #[error("bulk insert rolled back after {inserted} record(s): {source}")]
    BulkInsert {
        inserted: usize,
        #[source]
        source: Box<RosterError>,
    },
}

pub type Result<T> = std::result::Result<T, RosterError>;

impl RosterError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RosterError::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RosterError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RosterError::Conflict(_) => ErrorKind::Conflict,
            RosterError::Storage(_) | RosterError::Timeout | RosterError::Background(_) => ErrorKind::Storage,
            RosterError::BulkInsert { source, .. } => match source.kind() {
                ErrorKind::InvalidArgument => ErrorKind::InvalidArgument,
                _ => ErrorKind::Storage,
            },
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            RosterError::Timeout => true,
            RosterError::BulkInsert { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for RosterError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _) if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE => {
                RosterError::Conflict("a student with this email address already exists".to_string())
            }
            rusqlite::Error::SqliteFailure(failure, _) if failure.code == ffi::ErrorCode::OperationInterrupted => RosterError::Timeout,
            _ => RosterError::Storage(err),
        }
    }
}

/// Short, query-free description of a rusqlite error.
fn describe(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => failure.to_string(),
        rusqlite::Error::InvalidColumnType(index, _, kind) => format!("unexpected {} value in column {}", kind, index),
        rusqlite::Error::FromSqlConversionFailure(index, kind, _) => format!("cannot convert {} value in column {}", kind, index),
        rusqlite::Error::QueryReturnedNoRows => "query returned no rows".to_string(),
        _ => "database operation failed".to_string(),
    }
}

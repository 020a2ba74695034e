//! Error types
//!
//! `StoreError` covers every failure reported by a link store backend.
//! `LinkError` is what collection operations return: a local validation
//! failure, a store failure, or an operation attempted while signed out.

use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Errors reported by a link store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached
    #[error("Could not reach the link store: {0}")]
    Transport(String),

    /// The session is missing, expired, or rejected
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// A required field was missing or a constraint was violated
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The link does not exist or belongs to another owner
    #[error("Link {id} not found")]
    NotFoundOrForbidden { id: Uuid },

    /// The backend answered with an unexpected status
    #[error("Link store returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// A stored row or response body could not be decoded
    #[error("Invalid data from link store: {0}")]
    Decode(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A blocking storage task failed to complete
    #[error("Storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Classify a SQLite error, surfacing constraint failures
    pub fn from_sqlite(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(ref e, ref msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(
                    msg.clone()
                        .unwrap_or_else(|| "constraint failed".to_string()),
                )
            }
            other => StoreError::Database(other),
        }
    }

    /// Check if retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Transport(_)
                | StoreError::Task(_)
                | StoreError::Backend { status: 500..=599, .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Transport(_) => Some("Check your network connection and try again."),
            StoreError::Unauthorized(_) => Some("Sign in again with `linkhub login`."),
            StoreError::NotFoundOrForbidden { .. } => {
                Some("Run `linkhub link list` to refresh your links.")
            }
            StoreError::Constraint(_) => Some("Check that title, URL, and category are set."),
            _ => None,
        }
    }
}

/// Errors returned by collection operations
#[derive(Error, Debug)]
pub enum LinkError {
    /// Input was rejected before reaching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store rejected or failed the request
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No user is signed in
    #[error("Not signed in. Run `linkhub login` first.")]
    SignedOut,
}

impl LinkError {
    /// The store error, if this is one
    pub fn as_store(&self) -> Option<&StoreError> {
        match self {
            LinkError::Store(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a not-found-or-forbidden store error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LinkError::Store(StoreError::NotFoundOrForbidden { .. })
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_classification() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code: 275,
            },
            Some("CHECK constraint failed: length(title) > 0".to_string()),
        );
        let err = StoreError::from_sqlite(err);
        assert!(matches!(err, StoreError::Constraint(ref m) if m.contains("title")));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_other_sqlite_errors_stay_database() {
        let err = StoreError::from_sqlite(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(StoreError::Transport("timeout".into()).is_retryable());
        assert!(StoreError::Backend {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!StoreError::Backend {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!StoreError::NotFoundOrForbidden { id: Uuid::nil() }.is_retryable());
    }

    #[test]
    fn test_not_found_display_does_not_mention_owner() {
        let err = StoreError::NotFoundOrForbidden { id: Uuid::nil() };
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(!msg.contains("owner"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_link_error_helpers() {
        let err: LinkError = StoreError::NotFoundOrForbidden { id: Uuid::nil() }.into();
        assert!(err.is_not_found());
        assert!(err.as_store().is_some());
        assert!(!LinkError::SignedOut.is_not_found());
    }
}

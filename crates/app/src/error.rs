//! Application error taxonomy.

use domain::WishlistError;
use store::StoreError;
use thiserror::Error;

use crate::validate::FieldViolation;

/// The error kinds the transport boundary maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Validation,
    BadRequest,
    Cancelled,
    Unexpected,
}

/// Errors returned by handlers and pipeline behaviors.
///
/// The pipeline never downgrades or hides a kind; the boundary outside this
/// crate maps each kind deterministically to a transport status.
#[derive(Debug, Error)]
pub enum AppError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The authenticated caller lacks rights over the entity.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// A uniqueness or exclusivity rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input, caught by the pipeline before the handler ran.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// A semantically invalid request shape detected by the handler itself.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request was cancelled before it committed.
    #[error("operation cancelled")]
    Cancelled,

    /// Anything unanticipated. Logged with full context before surfacing.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Creates a not-found error for an entity.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    /// Creates an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        AppError::Unexpected(message.into())
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::BadRequest(_) => ErrorKind::BadRequest,
            AppError::Cancelled => ErrorKind::Cancelled,
            AppError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Returns the field violations of a validation failure.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            AppError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { .. } => AppError::Conflict(err.to_string()),
            StoreError::SessionClosed => AppError::Unexpected(err.to_string()),
        }
    }
}

impl From<WishlistError> for AppError {
    fn from(err: WishlistError) -> Self {
        match err {
            WishlistError::ReservedByAnother => {
                AppError::Forbidden("item is reserved by another user")
            }
            WishlistError::EmptyField(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

use sea_orm::{DbErr, SqlErr};

/// Errors surfaced by the tutoring core.
///
/// Storage failures are kept apart from validation failures so callers can
/// tell "bad input" from "backend down".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("language model unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Error::AlreadyExists(message.into())
    }

    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }

    /// Map a unique/primary-key violation to `AlreadyExists`, anything else to `Database`.
    pub(crate) fn from_insert(err: DbErr, what: &str) -> Self {
        if is_unique_violation(&err) {
            Error::AlreadyExists(what.to_string())
        } else {
            Error::Database(err)
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

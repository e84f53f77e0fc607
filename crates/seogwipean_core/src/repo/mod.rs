//! Repository layer: result-wrapped CRUD operations over SQLite.
//!
//! # Responsibility
//! - Run every operation on its own scoped connection.
//! - Translate internal errors into [`Outcome`] so nothing escapes to callers.
//!
//! # Invariants
//! - Caller-correctable errors (`Validation`, `Domain`) become `Outcome::Fail`
//!   with a display message; everything else becomes `Outcome::Exception`.
//! - Write paths validate input before any SQL mutation.
//! - Lookups without a match are `Success(None)` or an empty list.

use crate::db::DbError;
use crate::model::booking::BookingUpdateError;
use crate::model::codes::StatusChangeError;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod booking_repo;
pub mod coupon_repo;
pub mod outcome;
mod scope;
pub mod surf_repo;

pub use outcome::{Outcome, ResultCode, ResultEnvelope};
pub use scope::ensure_connection_ready;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// Required input missing or malformed.
    Validation(ValidationError),
    /// Business rule rejected the request (unknown target, invalid state transition).
    Domain(String),
    Db(DbError),
    /// Stored row could not be mapped back to a model.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl RepoError {
    /// Whether the caller can fix the request and retry.
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Domain(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Domain(message) => f.write_str(message),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Domain(_) | Self::InvalidData(_) | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StatusChangeError> for RepoError {
    fn from(value: StatusChangeError) -> Self {
        Self::Domain(value.to_string())
    }
}

impl From<BookingUpdateError> for RepoError {
    fn from(value: BookingUpdateError) -> Self {
        match value {
            BookingUpdateError::Invalid(err) => err.into(),
            BookingUpdateError::Status(err) => err.into(),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn invalid_status(table: &str, value: &str) -> RepoError {
    RepoError::InvalidData(format!("invalid status `{value}` in {table}.status"))
}

//! Error taxonomy surfaced by container-tree operations.

use crate::compound_id::CompoundIdError;
use crate::db::DbError;
use crate::query::{PageTokenError, Table, ThresholdError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ServiceResult<T> = Result<T, RnaServiceError>;

/// Typed failure carrying the offending identifier.
///
/// None of these are retried; the store is local and deterministic.
#[derive(Debug)]
pub enum RnaServiceError {
    InvalidSegment(String),
    MalformedIdentifier {
        token: String,
        expected_depth: usize,
        actual_depth: usize,
    },
    InvalidPageToken(String),
    /// Threshold is NaN or infinite.
    InvalidThreshold(f64),
    StoreUnavailable {
        location: PathBuf,
        reason: String,
    },
    RecordMalformed {
        table: Table,
        record_id: Option<String>,
        detail: String,
    },
    QuantificationNotFound(String),
    ExpressionLevelNotFound(String),
    RnaQuantificationSetNotFound(String),
    /// A set with the same local id already belongs to the dataset.
    DuplicateQuantificationSet(String),
    /// Other store failures (schema version, SQLite errors).
    Db(DbError),
}

impl Display for RnaServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSegment(segment) => write!(f, "invalid compound id segment `{segment}`"),
            Self::MalformedIdentifier {
                token,
                expected_depth,
                actual_depth,
            } => write!(
                f,
                "malformed compound id `{token}`: expected {expected_depth} segments, got {actual_depth}"
            ),
            Self::InvalidPageToken(token) => write!(f, "invalid page token `{token}`"),
            Self::InvalidThreshold(value) => {
                write!(f, "invalid threshold `{value}`: must be a finite number")
            }
            Self::StoreUnavailable { location, reason } => write!(
                f,
                "store unavailable at `{}`: {reason}",
                location.display()
            ),
            Self::RecordMalformed {
                table,
                record_id,
                detail,
            } => match record_id {
                Some(id) => write!(f, "malformed {table} record `{id}`: {detail}"),
                None => write!(f, "malformed {table} record: {detail}"),
            },
            Self::QuantificationNotFound(id) => write!(f, "rna quantification not found: {id}"),
            Self::ExpressionLevelNotFound(id) => write!(f, "expression level not found: {id}"),
            Self::RnaQuantificationSetNotFound(id) => {
                write!(f, "rna quantification set not found: {id}")
            }
            Self::DuplicateQuantificationSet(id) => {
                write!(f, "rna quantification set already exists: {id}")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RnaServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CompoundIdError> for RnaServiceError {
    fn from(value: CompoundIdError) -> Self {
        match value {
            CompoundIdError::InvalidSegment { segment } => Self::InvalidSegment(segment),
            CompoundIdError::MalformedIdentifier {
                token,
                expected_depth,
                actual_depth,
            } => Self::MalformedIdentifier {
                token,
                expected_depth,
                actual_depth,
            },
        }
    }
}

impl From<PageTokenError> for RnaServiceError {
    fn from(value: PageTokenError) -> Self {
        Self::InvalidPageToken(value.token)
    }
}

impl From<ThresholdError> for RnaServiceError {
    fn from(value: ThresholdError) -> Self {
        Self::InvalidThreshold(value.value)
    }
}

impl From<DbError> for RnaServiceError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::StoreUnavailable { location, reason } => {
                Self::StoreUnavailable { location, reason }
            }
            other => Self::Db(other),
        }
    }
}

impl From<RepoError> for RnaServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => err.into(),
            RepoError::RecordMalformed {
                table,
                record_id,
                detail,
            } => Self::RecordMalformed {
                table,
                record_id,
                detail,
            },
        }
    }
}

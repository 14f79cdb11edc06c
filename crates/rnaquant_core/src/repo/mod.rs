//! Repository layer over the quantification store.
//!
//! # Responsibility
//! - Turn fixed query shapes into typed row records.
//! - Keep column names, boolean coercion and row integrity checks inside
//!   the store-adapter boundary.
//!
//! # Invariants
//! - Rows missing a required column are rejected as `RecordMalformed`
//!   while decoding, never later.
//! - Point lookups return zero or one record; duplicates are an integrity
//!   violation.

use crate::db::DbError;
use crate::query::Table;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod rna_repo;
pub mod rows;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for store reads and row decoding.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Row does not conform to the fixed schema.
    RecordMalformed {
        table: Table,
        record_id: Option<String>,
        detail: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RecordMalformed {
                table,
                record_id,
                detail,
            } => match record_id {
                Some(id) => write!(f, "malformed {table} record `{id}`: {detail}"),
                None => write!(f, "malformed {table} record: {detail}"),
            },
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::RecordMalformed { .. } => None,
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

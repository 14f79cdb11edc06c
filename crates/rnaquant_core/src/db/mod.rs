//! Embedded store access for quantification data.
//!
//! # Responsibility
//! - Open read-only SQLite handles scoped to one logical operation.
//! - Execute the fixed query shapes from [`crate::query`].
//! - Create stores with the fixed schema for import tooling and tests.
//!
//! # Invariants
//! - Handles opened by [`open_store`] never write.
//! - A handle is released when the operation that opened it returns.
//! - Stores newer than [`schema::SCHEMA_VERSION`] are rejected.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

mod open;
pub mod schema;

pub use open::{open_store, open_store_with, with_store, StoreHandle};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Location is unreadable or does not hold a quantification store.
    StoreUnavailable { location: PathBuf, reason: String },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::StoreUnavailable { location, reason } => write!(
                f,
                "store unavailable at `{}`: {reason}",
                location.display()
            ),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::StoreUnavailable { .. } => None,
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Per-handle connection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// How long a reader waits on a locked store before failing.
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

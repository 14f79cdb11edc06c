//! Scoped, read-only store handles.
//!
//! # Responsibility
//! - Open a store file read-only and verify it carries the fixed schema.
//! - Run parameterized query shapes and decode rows through a callback.
//! - Log acquisition, queries and release with one correlation id.
//!
//! # Invariants
//! - Open failures of any kind surface as `DbError::StoreUnavailable`,
//!   except a too-new schema version.
//! - `with_store` never lets the handle escape the operation closure.

use super::schema::{stored_version, table_exists, REQUIRED_TABLES, SCHEMA_VERSION};
use super::{DbError, DbResult, StoreOptions};
use crate::query::QuerySpec;
use log::{debug, error, info};
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Read-only connection bound to one logical operation.
///
/// Dropping the handle closes the connection.
pub struct StoreHandle {
    conn: Connection,
    location: PathBuf,
    op_id: Uuid,
    opened_at: Instant,
}

impl StoreHandle {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Correlation id shared by all log events of this handle.
    pub fn op_id(&self) -> Uuid {
        self.op_id
    }

    /// Runs one query shape and decodes every row, in store order.
    ///
    /// Decoding stops at the first failing row; no partial result is
    /// returned.
    pub fn execute<T, E, F>(&self, spec: &QuerySpec, mut decode: F) -> Result<Vec<T>, E>
    where
        E: From<rusqlite::Error>,
        F: FnMut(&Row<'_>) -> Result<T, E>,
    {
        let started_at = Instant::now();
        let mut stmt = self.conn.prepare(&spec.sql)?;
        let mut rows = stmt.query(params_from_iter(spec.bind_values.iter()))?;
        let mut decoded = Vec::new();
        while let Some(row) = rows.next()? {
            decoded.push(decode(row)?);
        }

        debug!(
            "event=store_query module=db status=ok op={} table={} rows={} duration_ms={}",
            self.op_id,
            spec.table,
            decoded.len(),
            started_at.elapsed().as_millis()
        );
        Ok(decoded)
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        debug!(
            "event=store_release module=db status=ok op={} held_ms={}",
            self.op_id,
            self.opened_at.elapsed().as_millis()
        );
    }
}

/// Opens the store at `location` with default options.
pub fn open_store(location: impl AsRef<Path>) -> DbResult<StoreHandle> {
    open_store_with(location, &StoreOptions::default())
}

/// Opens the store at `location` read-only.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store_with(
    location: impl AsRef<Path>,
    options: &StoreOptions,
) -> DbResult<StoreHandle> {
    let location = location.as_ref();
    let op_id = Uuid::new_v4();
    let started_at = Instant::now();
    info!(
        "event=store_open module=db status=start op={op_id} location={}",
        location.display()
    );

    let conn = match Connection::open_with_flags(
        location,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    ) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=db status=error op={op_id} duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(unavailable(location, &err));
        }
    };

    match verify_store(&conn, options) {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok op={op_id} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(StoreHandle {
                conn,
                location: location.to_path_buf(),
                op_id,
                opened_at: started_at,
            })
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error op={op_id} duration_ms={} error_code=store_verify_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(match err {
                DbError::Sqlite(inner) => unavailable(location, &inner),
                DbError::StoreUnavailable { reason, .. } => DbError::StoreUnavailable {
                    location: location.to_path_buf(),
                    reason,
                },
                other => other,
            })
        }
    }
}

/// Opens a handle, runs `operation` on it and releases the handle on every
/// exit path.
pub fn with_store<T, E, F>(location: &Path, options: &StoreOptions, operation: F) -> Result<T, E>
where
    E: From<DbError>,
    F: FnOnce(&StoreHandle) -> Result<T, E>,
{
    let handle = open_store_with(location, options)?;
    operation(&handle)
}

fn verify_store(conn: &Connection, options: &StoreOptions) -> DbResult<()> {
    conn.busy_timeout(options.busy_timeout)?;
    conn.execute_batch("PRAGMA query_only = ON;")?;

    let version = stored_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table.as_str())? {
            return Err(DbError::StoreUnavailable {
                location: PathBuf::new(),
                reason: format!("missing required table `{table}`"),
            });
        }
    }

    Ok(())
}

fn unavailable(location: &Path, err: &rusqlite::Error) -> DbError {
    DbError::StoreUnavailable {
        location: location.to_path_buf(),
        reason: err.to_string(),
    }
}

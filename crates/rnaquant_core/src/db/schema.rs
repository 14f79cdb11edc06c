//! Fixed store schema and store creation.
//!
//! # Responsibility
//! - Own the DDL for `RnaQuantification` and `Expression`.
//! - Create writable stores for import tooling and fixtures.
//!
//! # Invariants
//! - Schema version is mirrored to `PRAGMA user_version`.
//! - Stores created elsewhere may carry version 0; they are accepted as long
//!   as the required tables exist.

use super::{DbError, DbResult};
use crate::query::Table;
use log::info;
use rusqlite::Connection;
use std::path::Path;

/// Latest schema version written and understood by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// Tables every readable store must contain.
pub const REQUIRED_TABLES: [Table; 2] = [Table::RnaQuantification, Table::Expression];

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates (or upgrades) a writable store at `path`.
///
/// Returns the open read-write connection so callers can load rows.
pub fn create_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    let mut conn = Connection::open(path.as_ref())?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    apply_schema(&mut conn)?;
    info!(
        "event=store_create module=db status=ok schema_version={}",
        SCHEMA_VERSION
    );
    Ok(conn)
}

/// Applies the schema on `conn` when its recorded version is older.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let current = stored_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

pub(crate) fn stored_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

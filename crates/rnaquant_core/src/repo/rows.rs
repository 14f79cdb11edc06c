//! Typed row records for the fixed store schema.
//!
//! # Responsibility
//! - Decode `RnaQuantification` and `Expression` rows by column name.
//! - Coerce stored integer booleans to `bool`.
//!
//! # Invariants
//! - A decoded record is fully typed; no column is read lazily.
//! - `is_normalized` accepts only `0` and `1`.
//! - Nullable text columns decode to empty strings.

use super::{RepoError, RepoResult};
use crate::db::DbError;
use crate::query::Table;
use rusqlite::types::FromSql;
use rusqlite::Row;

/// One `RnaQuantification` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RnaQuantificationRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Comma-joined feature set ids.
    pub feature_set_ids: String,
    /// Comma-joined read group ids; empty means none.
    pub read_group_ids: String,
    /// Comma-joined program ids; empty means none.
    pub programs: String,
}

impl RnaQuantificationRecord {
    pub fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let mut reader = RowReader::new(row, Table::RnaQuantification);
        let id: String = reader.required("id")?;
        reader.record_id = Some(id.clone());

        Ok(Self {
            id,
            name: reader.required("name")?,
            description: reader.text_or_empty("description")?,
            feature_set_ids: reader.text_or_empty("feature_set_ids")?,
            read_group_ids: reader.text_or_empty("read_group_ids")?,
            programs: reader.text_or_empty("programs")?,
        })
    }
}

/// One `Expression` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRecord {
    pub id: String,
    pub name: String,
    pub feature_id: String,
    pub rna_quantification_id: String,
    pub expression: f64,
    pub is_normalized: bool,
    pub raw_read_count: f64,
    pub score: f64,
    pub units: i64,
    pub conf_low: f64,
    pub conf_hi: f64,
}

impl ExpressionRecord {
    pub fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let mut reader = RowReader::new(row, Table::Expression);
        let id: String = reader.required("id")?;
        reader.record_id = Some(id.clone());

        Ok(Self {
            id,
            name: reader.required("name")?,
            feature_id: reader.required("feature_id")?,
            rna_quantification_id: reader.required("rna_quantification_id")?,
            expression: reader.required("expression")?,
            is_normalized: reader.flag("is_normalized")?,
            raw_read_count: reader.required("raw_read_count")?,
            score: reader.required("score")?,
            units: reader.required("units")?,
            conf_low: reader.required("conf_low")?,
            conf_hi: reader.required("conf_hi")?,
        })
    }
}

struct RowReader<'a, 'stmt> {
    row: &'a Row<'stmt>,
    table: Table,
    record_id: Option<String>,
}

impl<'a, 'stmt> RowReader<'a, 'stmt> {
    fn new(row: &'a Row<'stmt>, table: Table) -> Self {
        Self {
            row,
            table,
            record_id: None,
        }
    }

    fn required<T: FromSql>(&self, column: &'static str) -> RepoResult<T> {
        self.row
            .get::<_, T>(column)
            .map_err(|err| self.column_error(column, err))
    }

    fn text_or_empty(&self, column: &'static str) -> RepoResult<String> {
        Ok(self
            .required::<Option<String>>(column)?
            .unwrap_or_default())
    }

    fn flag(&self, column: &'static str) -> RepoResult<bool> {
        match self.required::<i64>(column)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.malformed(column, format!("expected 0 or 1, got {other}"))),
        }
    }

    fn column_error(&self, column: &'static str, err: rusqlite::Error) -> RepoError {
        match err {
            rusqlite::Error::InvalidColumnName(_) => {
                self.malformed(column, "column is missing".to_string())
            }
            rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => {
                self.malformed(column, err.to_string())
            }
            other => RepoError::Db(DbError::Sqlite(other)),
        }
    }

    fn malformed(&self, column: &'static str, detail: String) -> RepoError {
        RepoError::RecordMalformed {
            table: self.table,
            record_id: self.record_id.clone(),
            detail: format!("column `{column}`: {detail}"),
        }
    }
}

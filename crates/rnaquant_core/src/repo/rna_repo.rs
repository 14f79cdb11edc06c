//! Quantification repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Expose the supported reads over `RnaQuantification` and `Expression`.
//! - Map each read onto one fixed query shape.
//!
//! # Invariants
//! - Every read goes through [`StoreHandle::execute`] with bound values.
//! - Expression listing preserves store row order.

use super::rows::{ExpressionRecord, RnaQuantificationRecord};
use super::{RepoError, RepoResult};
use crate::db::StoreHandle;
use crate::query::{
    point_lookup, scoped_lookup, IdFilter, PageRequest, ScopedList, Table, COL_EXPRESSION,
    COL_FEATURE_ID, COL_ID, COL_RNA_QUANTIFICATION_ID,
};

/// Filter and page options for expression listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionListQuery {
    /// Local id of the owning quantification.
    pub rna_quantification_id: String,
    /// Minimum expression value. `None` applies no threshold.
    pub threshold: Option<f64>,
    pub feature_ids: IdFilter,
    pub page: PageRequest,
}

/// Read-only repository interface over one quantification store.
pub trait RnaQuantRepository {
    /// Every quantification in store order.
    fn list_quantifications(&self) -> RepoResult<Vec<RnaQuantificationRecord>>;
    fn get_quantification(&self, id: &str) -> RepoResult<Option<RnaQuantificationRecord>>;
    fn list_expressions(&self, query: &ExpressionListQuery) -> RepoResult<Vec<ExpressionRecord>>;
    /// Expression `id` of quantification `rna_quantification_id`.
    ///
    /// Expression ids are only unique within their quantification.
    fn get_expression(
        &self,
        rna_quantification_id: &str,
        id: &str,
    ) -> RepoResult<Option<ExpressionRecord>>;
}

/// SQLite-backed repository borrowing a scoped store handle.
pub struct SqliteRnaRepository<'h> {
    handle: &'h StoreHandle,
}

impl<'h> SqliteRnaRepository<'h> {
    pub fn new(handle: &'h StoreHandle) -> Self {
        Self { handle }
    }
}

impl RnaQuantRepository for SqliteRnaRepository<'_> {
    fn list_quantifications(&self) -> RepoResult<Vec<RnaQuantificationRecord>> {
        let spec = ScopedList::new(Table::RnaQuantification, PageRequest::unbounded()).build();
        self.handle
            .execute(&spec, |row| RnaQuantificationRecord::from_row(row))
    }

    fn get_quantification(&self, id: &str) -> RepoResult<Option<RnaQuantificationRecord>> {
        let spec = point_lookup(Table::RnaQuantification, COL_ID, id);
        let records = self
            .handle
            .execute(&spec, |row| RnaQuantificationRecord::from_row(row))?;
        at_most_one(Table::RnaQuantification, id, records)
    }

    fn list_expressions(&self, query: &ExpressionListQuery) -> RepoResult<Vec<ExpressionRecord>> {
        let spec = ScopedList::new(Table::Expression, query.page)
            .scoped_by(COL_RNA_QUANTIFICATION_ID, query.rna_quantification_id.as_str())
            .at_least(COL_EXPRESSION, query.threshold)
            .member_of(COL_FEATURE_ID, &query.feature_ids)
            .build();
        self.handle
            .execute(&spec, |row| ExpressionRecord::from_row(row))
    }

    fn get_expression(
        &self,
        rna_quantification_id: &str,
        id: &str,
    ) -> RepoResult<Option<ExpressionRecord>> {
        let spec = scoped_lookup(
            Table::Expression,
            (COL_ID, id),
            (COL_RNA_QUANTIFICATION_ID, rna_quantification_id),
        );
        let records = self
            .handle
            .execute(&spec, |row| ExpressionRecord::from_row(row))?;
        at_most_one(Table::Expression, id, records)
    }
}

fn at_most_one<T>(table: Table, id: &str, mut records: Vec<T>) -> RepoResult<Option<T>> {
    match records.len() {
        0 => Ok(None),
        1 => Ok(records.pop()),
        count => Err(RepoError::RecordMalformed {
            table,
            record_id: Some(id.to_string()),
            detail: format!("{count} rows share this id"),
        }),
    }
}

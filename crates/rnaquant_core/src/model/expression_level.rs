//! Expression level entity.

use crate::compound_id::{ExpressionLevelId, QuantificationId};
use crate::protocol::ExpressionLevelMessage;
use crate::query::Table;
use crate::repo::rows::ExpressionRecord;
use crate::repo::{RepoError, RepoResult};
use std::hash::{Hash, Hasher};

/// Expression of one feature in one quantification. Immutable.
#[derive(Debug, Clone)]
pub struct ExpressionLevel {
    id: ExpressionLevelId,
    name: String,
    feature_id: String,
    expression: f64,
    is_normalized: bool,
    raw_read_count: f64,
    score: f64,
    units: i64,
    conf_interval_low: f64,
    conf_interval_high: f64,
}

impl ExpressionLevel {
    /// Hydrates an expression level owned by `parent` from one store row.
    ///
    /// # Errors
    /// - `RecordMalformed` when the row belongs to another quantification or
    ///   its id cannot be used as a local id.
    pub fn hydrate(parent: &QuantificationId, record: ExpressionRecord) -> RepoResult<Self> {
        if record.rna_quantification_id != parent.local_id() {
            return Err(RepoError::RecordMalformed {
                table: Table::Expression,
                record_id: Some(record.id),
                detail: format!(
                    "row belongs to quantification `{}`, not `{}`",
                    record.rna_quantification_id,
                    parent.local_id()
                ),
            });
        }

        let id = parent
            .child(&record.id)
            .map_err(|err| RepoError::RecordMalformed {
                table: Table::Expression,
                record_id: Some(record.id.clone()),
                detail: err.to_string(),
            })?;

        Ok(Self {
            id,
            name: record.name,
            feature_id: record.feature_id,
            expression: record.expression,
            is_normalized: record.is_normalized,
            raw_read_count: record.raw_read_count,
            score: record.score,
            units: record.units,
            conf_interval_low: record.conf_low,
            conf_interval_high: record.conf_hi,
        })
    }

    pub fn id(&self) -> &ExpressionLevelId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature_id(&self) -> &str {
        &self.feature_id
    }

    pub fn expression(&self) -> f64 {
        self.expression
    }

    pub fn is_normalized(&self) -> bool {
        self.is_normalized
    }

    pub fn raw_read_count(&self) -> f64 {
        self.raw_read_count
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Store unit code.
    pub fn units(&self) -> i64 {
        self.units
    }

    /// `(low, high)` confidence interval.
    pub fn confidence_interval(&self) -> (f64, f64) {
        (self.conf_interval_low, self.conf_interval_high)
    }

    pub fn to_protocol(&self) -> ExpressionLevelMessage {
        ExpressionLevelMessage {
            id: self.id.token(),
            name: self.name.clone(),
            feature_id: self.feature_id.clone(),
            rna_quantification_id: self.id.parent().token(),
            raw_read_count: self.raw_read_count,
            expression: self.expression,
            is_normalized: self.is_normalized,
            units: self.units,
            score: self.score,
            conf_interval_low: self.conf_interval_low,
            conf_interval_high: self.conf_interval_high,
        }
    }
}

impl PartialEq for ExpressionLevel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ExpressionLevel {}

impl Hash for ExpressionLevel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

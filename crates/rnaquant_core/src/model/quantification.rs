//! Quantification entity.
//!
//! # Invariants
//! - `feature_set_ids` is a set; `read_group_ids` keeps store order.
//! - `programs` stays empty until program ids can be resolved upstream.

use crate::compound_id::{QuantificationId, QuantificationSetId};
use crate::protocol::RnaQuantificationMessage;
use crate::query::Table;
use crate::repo::rows::RnaQuantificationRecord;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// One RNA quantification within a quantification set.
#[derive(Debug, Clone)]
pub struct Quantification {
    id: QuantificationId,
    name: String,
    description: String,
    feature_set_ids: BTreeSet<String>,
    read_group_ids: Vec<String>,
    programs: Vec<String>,
    reference_set_id: Option<String>,
}

impl Quantification {
    /// Hydrates a quantification owned by `parent` from one store row.
    ///
    /// # Errors
    /// - `RecordMalformed` when the row id cannot be used as a local id.
    pub fn hydrate(
        parent: &QuantificationSetId,
        record: RnaQuantificationRecord,
        reference_set_id: Option<String>,
    ) -> RepoResult<Self> {
        let id = parent
            .child(&record.id)
            .map_err(|err| RepoError::RecordMalformed {
                table: Table::RnaQuantification,
                record_id: Some(record.id.clone()),
                detail: err.to_string(),
            })?;

        let unresolved_programs = split_list(&record.programs).len();
        if unresolved_programs > 0 {
            debug!(
                "event=programs_unresolved module=model status=ok count={}",
                unresolved_programs
            );
        }

        Ok(Self {
            id,
            name: record.name,
            description: record.description,
            feature_set_ids: split_list(&record.feature_set_ids).into_iter().collect(),
            read_group_ids: split_list(&record.read_group_ids),
            programs: Vec::new(),
            reference_set_id,
        })
    }

    pub fn id(&self) -> &QuantificationId {
        &self.id
    }

    pub fn local_id(&self) -> &str {
        self.id.local_id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn feature_set_ids(&self) -> &BTreeSet<String> {
        &self.feature_set_ids
    }

    pub fn read_group_ids(&self) -> &[String] {
        &self.read_group_ids
    }

    pub fn programs(&self) -> &[String] {
        &self.programs
    }

    pub fn reference_set_id(&self) -> Option<&str> {
        self.reference_set_id.as_deref()
    }

    pub fn to_protocol(&self) -> RnaQuantificationMessage {
        RnaQuantificationMessage {
            id: self.id.token(),
            name: self.name.clone(),
            description: self.description.clone(),
            feature_set_ids: self.feature_set_ids.iter().cloned().collect(),
            read_group_ids: self.read_group_ids.clone(),
            programs: self.programs.clone(),
            rna_quantification_set_id: self.id.parent().token(),
            reference_set_id: self.reference_set_id.clone(),
        }
    }
}

impl PartialEq for Quantification {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Quantification {}

impl Hash for Quantification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Splits a comma-joined column; an empty string yields no items.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

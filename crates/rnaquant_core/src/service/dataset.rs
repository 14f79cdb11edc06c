//! Dataset root container and store location lookup.
//!
//! # Responsibility
//! - Own quantification sets exclusively, in insertion order.
//! - Route compound ids to the set named by their ancestry prefix; an
//!   unknown set is always `RnaQuantificationSetNotFound`.
//! - Obtain store locations from a [`StoreLocator`] collaborator.
//!
//! # Invariants
//! - Set local ids are unique within a dataset.
//! - A set is fully configured (location, reference set) before it is
//!   reachable through the dataset.

use super::errors::{RnaServiceError, ServiceResult};
use super::quantification_set::QuantificationSet;
use crate::compound_id::{
    DatasetId, ExpressionLevelId, QuantificationId, QuantificationSetId,
};
use crate::db::StoreOptions;
use crate::model::expression_level::ExpressionLevel;
use crate::model::quantification::Quantification;
use log::info;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Resolves the backing store of a dataset-scoped container.
pub trait StoreLocator {
    /// Returns the store location of container `local_id` in `dataset_id`,
    /// or `None` when the container is unknown.
    fn locate(&self, dataset_id: &DatasetId, local_id: &str) -> Option<PathBuf>;
}

/// In-memory locator keyed by `(dataset local id, container local id)`.
#[derive(Debug, Clone, Default)]
pub struct StaticStoreLocator {
    locations: BTreeMap<(String, String), PathBuf>,
}

impl StaticStoreLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        dataset_local_id: impl Into<String>,
        local_id: impl Into<String>,
        location: impl Into<PathBuf>,
    ) {
        self.locations.insert(
            (dataset_local_id.into(), local_id.into()),
            location.into(),
        );
    }
}

impl StoreLocator for StaticStoreLocator {
    fn locate(&self, dataset_id: &DatasetId, local_id: &str) -> Option<PathBuf> {
        self.locations
            .get(&(dataset_id.local_id().to_string(), local_id.to_string()))
            .cloned()
    }
}

/// Root of the container tree.
pub struct Dataset {
    id: DatasetId,
    store_options: StoreOptions,
    quantification_sets: Vec<QuantificationSet>,
}

impl Dataset {
    pub fn new(local_id: &str) -> ServiceResult<Self> {
        Ok(Self {
            id: DatasetId::root(local_id)?,
            store_options: StoreOptions::default(),
            quantification_sets: Vec::new(),
        })
    }

    /// Options applied to every set added afterwards.
    pub fn with_store_options(mut self, options: StoreOptions) -> Self {
        self.store_options = options;
        self
    }

    pub fn id(&self) -> &DatasetId {
        &self.id
    }

    /// Adds a set backed by the store at `store_location`.
    ///
    /// # Errors
    /// - `InvalidSegment` when `local_id` cannot be embedded in an id.
    /// - `DuplicateQuantificationSet` when the local id is taken.
    pub fn add_quantification_set(
        &mut self,
        local_id: &str,
        store_location: impl Into<PathBuf>,
        reference_set_id: Option<String>,
    ) -> ServiceResult<&QuantificationSet> {
        let id = self.id.child(local_id)?;
        if self.find_set(&id).is_some() {
            return Err(RnaServiceError::DuplicateQuantificationSet(id.token()));
        }

        let set = QuantificationSet::new(id, store_location)
            .with_reference_set(reference_set_id)
            .with_store_options(self.store_options);
        info!(
            "event=quantification_set_add module=service status=ok position={}",
            self.quantification_sets.len()
        );
        self.quantification_sets.push(set);
        Ok(&self.quantification_sets[self.quantification_sets.len() - 1])
    }

    /// Adds a set whose store location comes from `locator`.
    ///
    /// # Errors
    /// - `RnaQuantificationSetNotFound` when the locator has no location.
    pub fn load_quantification_set<L>(
        &mut self,
        local_id: &str,
        locator: &L,
        reference_set_id: Option<String>,
    ) -> ServiceResult<&QuantificationSet>
    where
        L: StoreLocator + ?Sized,
    {
        let id = self.id.child(local_id)?;
        let location = locator
            .locate(&self.id, local_id)
            .ok_or_else(|| RnaServiceError::RnaQuantificationSetNotFound(id.token()))?;
        self.add_quantification_set(local_id, location, reference_set_id)
    }

    pub fn quantification_sets(&self) -> &[QuantificationSet] {
        &self.quantification_sets
    }

    /// Looks up a set by compound id without touching its store.
    pub fn quantification_set(&self, token: &str) -> ServiceResult<&QuantificationSet> {
        let id = QuantificationSetId::parse(token)?;
        self.set_by_id(&id)
    }

    pub fn quantification_set_by_name(&self, name: &str) -> ServiceResult<&QuantificationSet> {
        let id = self.id.child(name)?;
        self.set_by_id(&id)
    }

    /// Looks up a set and makes sure its quantifications are discovered.
    pub fn resolve_set(&self, token: &str) -> ServiceResult<&QuantificationSet> {
        let set = self.quantification_set(token)?;
        set.quantifications()?;
        Ok(set)
    }

    /// Resolves a quantification through the set named by its id.
    ///
    /// # Errors
    /// - `RnaQuantificationSetNotFound` when the set segment names no set of
    ///   this dataset.
    /// - `QuantificationNotFound` when the set has no such quantification.
    pub fn resolve_quantification(&self, token: &str) -> ServiceResult<Quantification> {
        let id = QuantificationId::parse(token)?;
        self.set_by_id(&id.parent())?.resolve_quantification(token)
    }

    /// Resolves an expression level through the set named by its id.
    ///
    /// # Errors
    /// - `RnaQuantificationSetNotFound` when the set segment names no set of
    ///   this dataset.
    /// - `ExpressionLevelNotFound` when the quantification has no such level.
    pub fn resolve_expression_level(&self, token: &str) -> ServiceResult<ExpressionLevel> {
        let id = ExpressionLevelId::parse(token)?;
        self.set_by_id(&id.parent().parent())?
            .resolve_expression_level(token)
    }

    pub(crate) fn set_by_id(&self, id: &QuantificationSetId) -> ServiceResult<&QuantificationSet> {
        self.find_set(id)
            .ok_or_else(|| RnaServiceError::RnaQuantificationSetNotFound(id.token()))
    }

    fn find_set(&self, id: &QuantificationSetId) -> Option<&QuantificationSet> {
        self.quantification_sets.iter().find(|set| set.id() == id)
    }
}

//! Quantification set container.
//!
//! # Responsibility
//! - Discover member quantifications once and cache them for the lifetime
//!   of the set.
//! - Resolve quantifications and expression levels addressed by compound id.
//! - List expression levels of one quantification with filters and paging.
//!
//! # Invariants
//! - Each public operation opens at most one store handle and releases it
//!   before returning.
//! - Discovery runs at most once successfully per set instance, even under
//!   concurrent first access.
//! - Compound ids outside this set never resolve against its store.

use super::errors::{RnaServiceError, ServiceResult};
use crate::compound_id::{ExpressionLevelId, QuantificationId, QuantificationSetId};
use crate::db::{with_store, StoreOptions};
use crate::model::expression_level::ExpressionLevel;
use crate::model::quantification::Quantification;
use crate::protocol::RnaQuantificationSetMessage;
use crate::query::{check_threshold, IdFilter, PageRequest, PageToken};
use crate::repo::rna_repo::{ExpressionListQuery, RnaQuantRepository, SqliteRnaRepository};
use crate::repo::RepoResult;
use log::{debug, error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Filters and paging for [`QuantificationSet::list_expression_levels`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionLevelQuery {
    pub page: PageRequest,
    /// Minimum expression value; `None` applies no threshold.
    pub threshold: Option<f64>,
    pub feature_ids: IdFilter,
}

/// One page of expression levels in store order.
///
/// Consumed by iteration; a new query is needed to read the rows again.
#[derive(Debug, Clone, Default)]
pub struct ExpressionLevelPage {
    items: Vec<ExpressionLevel>,
    next_page_token: Option<PageToken>,
}

impl ExpressionLevelPage {
    pub fn items(&self) -> &[ExpressionLevel] {
        &self.items
    }

    /// Offset of the following page, present only after a full page.
    pub fn next_page_token(&self) -> Option<PageToken> {
        self.next_page_token
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ExpressionLevelPage {
    type Item = ExpressionLevel;
    type IntoIter = std::vec::IntoIter<ExpressionLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Slice of the cached quantifications.
#[derive(Debug, Clone, Copy)]
pub struct QuantificationPage<'a> {
    pub items: &'a [Quantification],
    pub next_page_token: Option<PageToken>,
}

/// Container of quantifications backed by one store file.
pub struct QuantificationSet {
    id: QuantificationSetId,
    store_location: PathBuf,
    store_options: StoreOptions,
    reference_set_id: Option<String>,
    quantifications: OnceCell<Vec<Quantification>>,
}

impl QuantificationSet {
    pub fn new(id: QuantificationSetId, store_location: impl Into<PathBuf>) -> Self {
        Self {
            id,
            store_location: store_location.into(),
            store_options: StoreOptions::default(),
            reference_set_id: None,
            quantifications: OnceCell::new(),
        }
    }

    /// Associates a reference set. Only the owning dataset calls this, while
    /// building the set and before it becomes visible.
    pub(crate) fn with_reference_set(mut self, reference_set_id: Option<String>) -> Self {
        self.reference_set_id = reference_set_id;
        self
    }

    pub fn with_store_options(mut self, options: StoreOptions) -> Self {
        self.store_options = options;
        self
    }

    pub fn id(&self) -> &QuantificationSetId {
        &self.id
    }

    /// The set name is its local id.
    pub fn name(&self) -> &str {
        self.id.local_id()
    }

    pub fn store_location(&self) -> &Path {
        &self.store_location
    }

    pub fn reference_set_id(&self) -> Option<&str> {
        self.reference_set_id.as_deref()
    }

    /// Member quantifications in store order, discovered on first call.
    pub fn quantifications(&self) -> ServiceResult<&[Quantification]> {
        let cached = self
            .quantifications
            .get_or_try_init(|| self.discover_quantifications())?;
        Ok(cached.as_slice())
    }

    pub fn num_quantifications(&self) -> ServiceResult<usize> {
        Ok(self.quantifications()?.len())
    }

    pub fn quantification_by_index(&self, index: usize) -> ServiceResult<Option<&Quantification>> {
        Ok(self.quantifications()?.get(index))
    }

    /// Looks up a cached quantification by id.
    pub fn quantification(&self, id: &QuantificationId) -> ServiceResult<&Quantification> {
        self.quantifications()?
            .iter()
            .find(|quantification| quantification.id() == id)
            .ok_or_else(|| RnaServiceError::QuantificationNotFound(id.token()))
    }

    /// Pages over the cached quantifications.
    pub fn quantifications_page(&self, page: &PageRequest) -> ServiceResult<QuantificationPage<'_>> {
        let all = self.quantifications()?;
        let start = usize::try_from(page.token.offset())
            .unwrap_or(usize::MAX)
            .min(all.len());
        let end = match page.size {
            Some(size) => start
                .saturating_add(usize::try_from(size).unwrap_or(usize::MAX))
                .min(all.len()),
            None => all.len(),
        };

        let next_page_token = if end < all.len() {
            Some(PageToken::new(u64::try_from(end).unwrap_or(u64::MAX)))
        } else {
            None
        };

        Ok(QuantificationPage {
            items: &all[start..end],
            next_page_token,
        })
    }

    /// Reads one quantification from the store by compound id.
    ///
    /// # Errors
    /// - `MalformedIdentifier` when `token` is not a quantification id.
    /// - `QuantificationNotFound` when the id belongs to another set or no
    ///   row matches its local id.
    pub fn resolve_quantification(&self, token: &str) -> ServiceResult<Quantification> {
        let id = QuantificationId::parse(token)?;
        if id.parent() != self.id {
            return Err(RnaServiceError::QuantificationNotFound(id.token()));
        }

        let record = self
            .read(|repo| repo.get_quantification(id.local_id()))?
            .ok_or_else(|| RnaServiceError::QuantificationNotFound(id.token()))?;
        Ok(Quantification::hydrate(
            &self.id,
            record,
            self.reference_set_id.clone(),
        )?)
    }

    /// Reads one expression level from the store by compound id.
    ///
    /// # Errors
    /// - `MalformedIdentifier` when `token` is not an expression level id.
    /// - `ExpressionLevelNotFound` when the id belongs to another set or no
    ///   row of its quantification has its local id.
    pub fn resolve_expression_level(&self, token: &str) -> ServiceResult<ExpressionLevel> {
        let id = ExpressionLevelId::parse(token)?;
        let quantification_id = id.parent();
        if quantification_id.parent() != self.id {
            return Err(RnaServiceError::ExpressionLevelNotFound(id.token()));
        }

        let record = self
            .read(|repo| repo.get_expression(quantification_id.local_id(), id.local_id()))?
            .ok_or_else(|| RnaServiceError::ExpressionLevelNotFound(id.token()))?;
        Ok(ExpressionLevel::hydrate(&quantification_id, record)?)
    }

    /// Lists expression levels of the quantification with local id
    /// `quantification_local_id`.
    ///
    /// An unknown quantification yields an empty page.
    ///
    /// # Errors
    /// - `InvalidThreshold` for a NaN or infinite threshold.
    /// - `QuantificationNotFound` when the id belongs to another set.
    pub fn list_expression_levels(
        &self,
        quantification_local_id: &str,
        query: &ExpressionLevelQuery,
    ) -> ServiceResult<ExpressionLevelPage> {
        let quantification_id = self.id.child(quantification_local_id)?;
        self.list_expression_levels_of(&quantification_id, query)
    }

    /// Same as [`Self::list_expression_levels`], addressed by compound id.
    pub fn list_expression_levels_of(
        &self,
        quantification_id: &QuantificationId,
        query: &ExpressionLevelQuery,
    ) -> ServiceResult<ExpressionLevelPage> {
        if quantification_id.parent() != self.id {
            return Err(RnaServiceError::QuantificationNotFound(
                quantification_id.token(),
            ));
        }

        let threshold = check_threshold(query.threshold)?;
        let list_query = ExpressionListQuery {
            rna_quantification_id: quantification_id.local_id().to_string(),
            threshold,
            feature_ids: query.feature_ids.clone(),
            page: query.page,
        };
        let records = self.read(|repo| repo.list_expressions(&list_query))?;
        let next_page_token = query.page.next_token(records.len());
        let items = records
            .into_iter()
            .map(|record| ExpressionLevel::hydrate(quantification_id, record))
            .collect::<RepoResult<Vec<_>>>()?;

        debug!(
            "event=expression_levels_list module=service status=ok rows={} offset={} has_next={}",
            items.len(),
            query.page.token,
            next_page_token.is_some()
        );
        Ok(ExpressionLevelPage {
            items,
            next_page_token,
        })
    }

    pub fn to_protocol(&self) -> RnaQuantificationSetMessage {
        RnaQuantificationSetMessage {
            id: self.id.token(),
            dataset_id: self.id.parent().token(),
            name: self.name().to_string(),
            reference_set_id: self.reference_set_id.clone(),
        }
    }

    fn discover_quantifications(&self) -> ServiceResult<Vec<Quantification>> {
        let started_at = Instant::now();
        let discovered = self
            .read(|repo| repo.list_quantifications())
            .and_then(|records| {
                records
                    .into_iter()
                    .map(|record| {
                        Quantification::hydrate(&self.id, record, self.reference_set_id.clone())
                    })
                    .collect::<RepoResult<Vec<_>>>()
                    .map_err(RnaServiceError::from)
            });

        match &discovered {
            Ok(quantifications) => info!(
                "event=quantifications_discover module=service status=ok count={} duration_ms={}",
                quantifications.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=quantifications_discover module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        discovered
    }

    fn read<T, F>(&self, operation: F) -> ServiceResult<T>
    where
        F: FnOnce(&SqliteRnaRepository<'_>) -> RepoResult<T>,
    {
        with_store(&self.store_location, &self.store_options, |handle| {
            let repo = SqliteRnaRepository::new(handle);
            operation(&repo).map_err(RnaServiceError::from)
        })
    }
}

//! Core domain logic for RNA quantification data.
//! Dataset, quantification set, quantification and expression level
//! containers over embedded per-set stores.

pub mod compound_id;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod query;
pub mod repo;
pub mod service;

pub use compound_id::{
    CompoundId, CompoundIdError, DatasetId, ExpressionLevelId, QuantificationId,
    QuantificationSetId,
};
pub use config::{ConfigError, CoreConfig};
pub use db::{DbError, StoreOptions};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::expression_level::ExpressionLevel;
pub use model::quantification::Quantification;
pub use protocol::{
    ExpressionLevelMessage, RnaQuantificationMessage, RnaQuantificationSetMessage,
    SearchExpressionLevelsRequest, SearchExpressionLevelsResponse,
    SearchRnaQuantificationsRequest, SearchRnaQuantificationsResponse,
};
pub use query::{IdFilter, PageRequest, PageToken};
pub use repo::{RepoError, RepoResult};
pub use service::dataset::{Dataset, StaticStoreLocator, StoreLocator};
pub use service::errors::{RnaServiceError, ServiceResult};
pub use service::quantification_set::{
    ExpressionLevelPage, ExpressionLevelQuery, QuantificationPage, QuantificationSet,
};
pub use service::search::{search_expression_levels, search_rna_quantifications};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

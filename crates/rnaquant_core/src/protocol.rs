//! Transfer objects handed to the request-handling layer.
//!
//! # Responsibility
//! - Define plain serde structs with the fixed boundary field names.
//! - Define the search envelopes for paginated expression-level and
//!   quantification listing.
//!
//! # Invariants
//! - Field names are part of the external contract and must not change.
//! - Ids are compound-id tokens; page tokens are decimal row offsets, with
//!   the empty string meaning "first page" / "no further page".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RnaQuantificationSetMessage {
    pub id: String,
    pub dataset_id: String,
    pub name: String,
    pub reference_set_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RnaQuantificationMessage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub feature_set_ids: Vec<String>,
    pub read_group_ids: Vec<String>,
    pub programs: Vec<String>,
    pub rna_quantification_set_id: String,
    pub reference_set_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionLevelMessage {
    pub id: String,
    pub name: String,
    pub feature_id: String,
    pub rna_quantification_id: String,
    pub raw_read_count: f64,
    pub expression: f64,
    pub is_normalized: bool,
    pub units: i64,
    pub score: f64,
    pub conf_interval_low: f64,
    pub conf_interval_high: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchExpressionLevelsRequest {
    pub rna_quantification_id: String,
    #[serde(default)]
    pub page_token: String,
    /// Zero means unset.
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Empty means no feature restriction.
    #[serde(default)]
    pub feature_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchExpressionLevelsResponse {
    pub expression_levels: Vec<ExpressionLevelMessage>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRnaQuantificationsRequest {
    pub rna_quantification_set_id: String,
    #[serde(default)]
    pub page_token: String,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRnaQuantificationsResponse {
    pub rna_quantifications: Vec<RnaQuantificationMessage>,
    pub next_page_token: String,
}

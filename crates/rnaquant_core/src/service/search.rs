//! Request/response entry points for paginated searches.
//!
//! # Responsibility
//! - Translate search envelopes into container-tree queries.
//! - Render results and page tokens back into transfer objects.

use super::dataset::Dataset;
use super::errors::ServiceResult;
use super::quantification_set::ExpressionLevelQuery;
use crate::compound_id::{QuantificationId, QuantificationSetId};
use crate::protocol::{
    SearchExpressionLevelsRequest, SearchExpressionLevelsResponse, SearchRnaQuantificationsRequest,
    SearchRnaQuantificationsResponse,
};
use crate::query::{IdFilter, PageRequest, PageToken};

/// Serves one expression-level search against `dataset`.
///
/// # Errors
/// - `MalformedIdentifier` for a quantification id of the wrong depth.
/// - `InvalidPageToken` for a non-numeric page token.
/// - `RnaQuantificationSetNotFound` when the owning set is unknown.
pub fn search_expression_levels(
    dataset: &Dataset,
    request: &SearchExpressionLevelsRequest,
) -> ServiceResult<SearchExpressionLevelsResponse> {
    let quantification_id = QuantificationId::parse(&request.rna_quantification_id)?;
    let set = dataset.set_by_id(&quantification_id.parent())?;
    let query = ExpressionLevelQuery {
        page: PageRequest::new(PageToken::parse(&request.page_token)?, Some(request.page_size)),
        threshold: request.threshold,
        feature_ids: IdFilter::from_ids(request.feature_ids.iter().cloned()),
    };

    let page = set.list_expression_levels_of(&quantification_id, &query)?;
    let next_page_token = render_token(page.next_page_token());
    Ok(SearchExpressionLevelsResponse {
        expression_levels: page.into_iter().map(|level| level.to_protocol()).collect(),
        next_page_token,
    })
}

/// Serves one quantification search against `dataset`.
pub fn search_rna_quantifications(
    dataset: &Dataset,
    request: &SearchRnaQuantificationsRequest,
) -> ServiceResult<SearchRnaQuantificationsResponse> {
    let set_id = QuantificationSetId::parse(&request.rna_quantification_set_id)?;
    let set = dataset.set_by_id(&set_id)?;
    let page_request =
        PageRequest::new(PageToken::parse(&request.page_token)?, Some(request.page_size));

    let page = set.quantifications_page(&page_request)?;
    Ok(SearchRnaQuantificationsResponse {
        rna_quantifications: page
            .items
            .iter()
            .map(|quantification| quantification.to_protocol())
            .collect(),
        next_page_token: render_token(page.next_page_token),
    })
}

fn render_token(token: Option<PageToken>) -> String {
    token.map(|value| value.to_string()).unwrap_or_default()
}

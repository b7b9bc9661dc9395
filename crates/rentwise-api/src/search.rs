//! Handler for `GET /law/search`.
//!
//! Deterministic search over the built-in corpus; identical queries always
//! return the same ranked results.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use rentwise_core::store::CaseStore;
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

const DEFAULT_TOP_K: usize = 5;
const MAX_TOP_K: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub query: String,
  pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LawSearchResult {
  pub title:      String,
  pub snippet:    String,
  pub source_url: String,
  pub as_of_date: NaiveDate,
  pub score:      u32,
}

#[derive(Debug, Serialize)]
pub struct LawSearchResponse {
  pub results: Vec<LawSearchResult>,
}

/// `GET /law/search?query=...[&top_k=...]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<LawSearchResponse>, ApiError>
where
  S: CaseStore + 'static,
{
  let top_k = params.top_k.unwrap_or(DEFAULT_TOP_K);
  if top_k == 0 || top_k > MAX_TOP_K {
    return Err(ApiError::Validation(format!(
      "top_k must be between 1 and {MAX_TOP_K}, got {top_k}"
    )));
  }

  let results = state
    .law
    .search(&params.query, top_k)
    .into_iter()
    .map(|hit| LawSearchResult {
      title:      hit.snippet.title.clone(),
      snippet:    hit.snippet.summary.clone(),
      source_url: hit.snippet.source_url.clone(),
      as_of_date: hit.snippet.as_of,
      score:      hit.score,
    })
    .collect();

  Ok(Json(LawSearchResponse { results }))
}

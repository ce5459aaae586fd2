//! Handler for `GET /search`.
//!
//! `q` is required (400 without it); `type` optionally restricts to one
//! level; `limit` caps the result count. Matching is a plain substring
//! over names — no relevance ranking.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use psgc_core::{
  entity::Level,
  store::{GeoStore, SearchQuery},
};
use serde::Deserialize;

use crate::{error::ApiError, response::ListEnvelope};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub q:     Option<String>,
  #[serde(rename = "type")]
  pub level: Option<String>,
  pub limit: Option<usize>,
}

/// `GET /search?q=<text>[&type=<level>][&limit=<n>]`
pub async fn handler<S: GeoStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<ListEnvelope>, ApiError> {
  let text = params
    .q
    .filter(|q| !q.trim().is_empty())
    .ok_or_else(|| {
      ApiError::BadRequest("missing required query parameter `q`".to_string())
    })?;
  let level = params.level.as_deref().map(parse_level).transpose()?;

  let data = store
    .search(SearchQuery { text, level, limit: params.limit })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ListEnvelope::new(data)))
}

fn parse_level(raw: &str) -> Result<Level, ApiError> {
  match raw.to_lowercase().as_str() {
    "region" => Ok(Level::Region),
    "province" => Ok(Level::Province),
    "city" => Ok(Level::City),
    "municipality" => Ok(Level::Municipality),
    "barangay" => Ok(Level::Barangay),
    _ => Err(ApiError::BadRequest(format!("unknown type {raw:?}"))),
  }
}

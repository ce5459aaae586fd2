//! Shared handler cores for the five resource families.
//!
//! Every family exposes the same three operations (list-all, get-by-code,
//! list-children), so the per-family modules are thin wrappers over these
//! generic implementations rather than five copies of the same body.

use std::sync::Arc;

use axum::Json;

use psgc_core::{
  code::GeographicCode,
  entity::Level,
  store::{AncestorFilter, GeoStore},
};

use crate::{
  error::ApiError,
  response::{AncestorRef, ItemEnvelope, ListEnvelope},
};

pub(crate) fn parse_code(raw: &str) -> Result<GeographicCode, ApiError> {
  GeographicCode::normalize(raw)
    .map_err(|_| ApiError::BadRequest(format!("invalid code {raw:?}")))
}

pub(crate) async fn list_all<S: GeoStore>(
  store: &Arc<S>,
  level: Level,
) -> Result<Json<ListEnvelope>, ApiError> {
  let data = store.list(level, None).await.map_err(ApiError::store)?;
  Ok(Json(ListEnvelope::new(data)))
}

pub(crate) async fn get_one<S: GeoStore>(
  store: &Arc<S>,
  level: Level,
  raw: &str,
) -> Result<Json<ItemEnvelope>, ApiError> {
  let code = parse_code(raw)?;
  let entity = store
    .get(level, code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{level} {raw} not found")))?;
  Ok(Json(ItemEnvelope::new(entity)))
}

/// List `child_level` under one ancestor, embedding the resolved
/// ancestor `{code, name}` in the envelope.
pub(crate) async fn children<S: GeoStore>(
  store: &Arc<S>,
  ancestor_level: Level,
  raw: &str,
  child_level: Level,
) -> Result<Json<ListEnvelope>, ApiError> {
  let code = parse_code(raw)?;
  let ancestor = store
    .get(ancestor_level, code.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("{ancestor_level} {raw} not found"))
    })?;
  let data = store
    .list(
      child_level,
      Some(AncestorFilter { level: ancestor_level, code }),
    )
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ListEnvelope::with_ancestor(data, AncestorRef::from(&ancestor))))
}

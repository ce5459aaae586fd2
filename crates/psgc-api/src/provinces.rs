//! Handlers for `/provinces` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use psgc_core::{entity::Level, store::GeoStore};

use crate::{
  error::ApiError,
  levels,
  response::{ItemEnvelope, ListEnvelope},
};

/// `GET /provinces`
pub async fn list<S: GeoStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::list_all(&store, Level::Province).await
}

/// `GET /provinces/{code}`
pub async fn get_one<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ItemEnvelope>, ApiError> {
  levels::get_one(&store, Level::Province, &code).await
}

/// `GET /provinces/{code}/cities`
pub async fn cities<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Province, &code, Level::City).await
}

/// `GET /provinces/{code}/municipalities`
pub async fn municipalities<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Province, &code, Level::Municipality).await
}

/// `GET /provinces/{code}/barangays`
pub async fn barangays<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Province, &code, Level::Barangay).await
}

//! Handlers for `/municipalities` endpoints.

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

/// `GET /municipalities`
pub async fn list<S: GeoStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::list_all(&store, Level::Municipality).await
}

/// `GET /municipalities/{code}`
pub async fn get_one<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ItemEnvelope>, ApiError> {
  levels::get_one(&store, Level::Municipality, &code).await
}

/// `GET /municipalities/{code}/barangays`
pub async fn barangays<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Municipality, &code, Level::Barangay).await
}

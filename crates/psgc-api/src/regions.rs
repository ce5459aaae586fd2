//! Handlers for `/regions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/regions` | |
//! | `GET`  | `/regions/{code}` | 404 if unknown |
//! | `GET`  | `/regions/{code}/provinces` | embeds the region as `ancestor` |
//! | `GET`  | `/regions/{code}/cities` | |
//! | `GET`  | `/regions/{code}/municipalities` | |
//! | `GET`  | `/regions/{code}/barangays` | |

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

/// `GET /regions`
pub async fn list<S: GeoStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::list_all(&store, Level::Region).await
}

/// `GET /regions/{code}`
pub async fn get_one<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ItemEnvelope>, ApiError> {
  levels::get_one(&store, Level::Region, &code).await
}

/// `GET /regions/{code}/provinces`
pub async fn provinces<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Region, &code, Level::Province).await
}

/// `GET /regions/{code}/cities`
pub async fn cities<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Region, &code, Level::City).await
}

/// `GET /regions/{code}/municipalities`
pub async fn municipalities<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Region, &code, Level::Municipality).await
}

/// `GET /regions/{code}/barangays`
pub async fn barangays<S: GeoStore>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<ListEnvelope>, ApiError> {
  levels::children(&store, Level::Region, &code, Level::Barangay).await
}

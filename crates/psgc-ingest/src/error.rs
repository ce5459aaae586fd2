//! Error types for `psgc-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("spreadsheet error: {0}")]
  Spreadsheet(#[from] calamine::Error),

  #[error("{path:?}: expected a JSON array of records (or an object with a `data` array)")]
  MalformedJson { path: PathBuf },

  #[error("{path:?}: workbook has no sheets")]
  EmptyWorkbook { path: PathBuf },

  #[error("unsupported source format: {path:?}")]
  UnsupportedFormat { path: PathBuf },

  #[error("hierarchy error: {0}")]
  Hierarchy(#[from] psgc_core::Error),

  #[error("store write failed: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

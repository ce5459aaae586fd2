//! Error types for `psgc-store-sqlite`.

use psgc_core::entity::Level;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("connection error: {0}")]
  Connection(#[from] tokio_rusqlite::Error),

  #[error("corrupt row: {0}")]
  Corrupt(String),

  #[error("cannot filter {level} listings by a {ancestor} ancestor")]
  InvalidAncestor { level: Level, ancestor: Level },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

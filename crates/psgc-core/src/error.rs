//! Error types for `psgc-core`.

use thiserror::Error;

use crate::code::CodeShape;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid geographic code {raw:?}: {reason}")]
  InvalidCode { raw: String, reason: &'static str },

  #[error("code {code} matches no level pattern")]
  UnclassifiableCode { code: String },

  #[error("cannot derive a {requested:?} ancestor from a {actual:?} code")]
  InvalidAncestorRequest {
    requested: CodeShape,
    actual:    CodeShape,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

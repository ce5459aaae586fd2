//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as the `{error, message}` envelope. Internal
//! failures log their detail and return an opaque 500.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("rate limit exceeded")]
  RateLimited,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(error))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, "bad_request", m.clone())
      }
      ApiError::RateLimited => (
        StatusCode::TOO_MANY_REQUESTS,
        "rate_limited",
        "too many requests, try again later".to_string(),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure in handler");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal",
          "internal error".to_string(),
        )
      }
    };
    (status, Json(json!({ "error": kind, "message": message })))
      .into_response()
  }
}

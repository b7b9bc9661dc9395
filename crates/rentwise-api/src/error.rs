//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body carries a machine-readable `kind` alongside the message
//! so callers can decide on retry without parsing prose: `not_found` and
//! `validation` are final, `upstream` is retryable, `internal` covers store
//! failures (conflicts are retried inside the store before surfacing here).

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

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("upstream unavailable: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  fn kind(&self) -> &'static str {
    match self {
      Self::NotFound(_) => "not_found",
      Self::Validation(_) => "validation",
      Self::Upstream(_) => "upstream",
      Self::Internal(_) => "internal",
    }
  }
}

impl From<rentwise_agents::Error> for ApiError {
  fn from(e: rentwise_agents::Error) -> Self {
    use rentwise_agents::Error as E;
    match e {
      E::CaseNotFound(_) | E::DocumentNotFound(_) => Self::NotFound(e.to_string()),
      E::UnknownTemplate(_) | E::UnsupportedChannel(_) | E::UnknownTarget(_) => {
        Self::Validation(e.to_string())
      }
      E::Generation(_) => Self::Upstream(e.to_string()),
      E::Store(inner) => Self::Internal(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = self.to_string();
    (status, Json(json!({ "error": message, "kind": self.kind() })))
      .into_response()
  }
}

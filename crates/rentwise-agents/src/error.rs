//! Error type shared by the agent operations.

use thiserror::Error;
use uuid::Uuid;

use crate::generate::GenerationError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("case not found: {0}")]
  CaseNotFound(Uuid),

  #[error("document not found: {0}")]
  DocumentNotFound(Uuid),

  #[error("unknown template: {0:?}")]
  UnknownTemplate(String),

  #[error("unsupported channel: {0:?}")]
  UnsupportedChannel(String),

  #[error("unknown escalation target: {0:?}")]
  UnknownTarget(String),

  #[error("generation backend error: {0}")]
  Generation(#[from] GenerationError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Box a backend-specific store error into [`Error::Store`].
pub(crate) fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

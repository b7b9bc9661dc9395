//! Error types for `rentwise-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("case not found: {0}")]
  CaseNotFound(Uuid),

  #[error("document not found: {0}")]
  DocumentNotFound(Uuid),

  /// A mutator removed or rewrote existing timeline entries.
  #[error("timeline for case {0} is append-only")]
  TimelineTruncated(Uuid),

  #[error("unknown case category: {0:?}")]
  UnknownCategory(String),

  #[error("unknown case status: {0:?}")]
  UnknownStatus(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

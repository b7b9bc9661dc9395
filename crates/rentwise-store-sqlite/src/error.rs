//! Error type for `rentwise-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rentwise_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to mutate a case that was not found.
  #[error("case not found: {0}")]
  CaseNotFound(uuid::Uuid),

  /// The database stayed locked for longer than the bounded busy timeout.
  #[error("conflicting write on case {0}; retries exhausted")]
  Conflict(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

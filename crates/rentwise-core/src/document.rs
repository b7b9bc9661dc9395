//! Document — a generated letter or notice tied to a case.
//!
//! Documents are never mutated after creation; redrafting produces a new
//! document with a fresh id rather than editing in place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one generated artifact. The rendered subject and body live in
/// `metadata` under the `subject` / `body` keys; `urls` maps an output channel
/// (e.g. `docx`) to its retrieval location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub document_id:  Uuid,
  /// Name of the template the document was rendered from.
  pub doc_type:     String,
  pub filename:     String,
  pub created_at:   DateTime<Utc>,
  /// SHA-256 hex digest of the rendered body; stable across identical drafts.
  pub content_hash: String,
  pub urls:         BTreeMap<String, String>,
  pub metadata:     BTreeMap<String, String>,
}

impl Document {
  pub fn subject(&self) -> Option<&str> {
    self.metadata.get("subject").map(String::as_str)
  }

  pub fn body(&self) -> Option<&str> {
    self.metadata.get("body").map(String::as_str)
  }
}

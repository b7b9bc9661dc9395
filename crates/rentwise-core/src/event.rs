//! Timeline events — the append-only audit trail of a case.
//!
//! An event is recorded whenever an agent completes a unit of work. Events
//! are immutable once appended and are never reordered or deleted; the store
//! enforces this.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single audit entry on a case timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
  pub occurred_at: DateTime<Utc>,
  /// Human-readable description, e.g. "Reasoning generated".
  pub label:       String,
  pub metadata:    BTreeMap<String, String>,
}

impl TimelineEvent {
  /// An event stamped with the current time and no metadata.
  pub fn now(label: impl Into<String>) -> Self {
    Self {
      occurred_at: Utc::now(),
      label:       label.into(),
      metadata:    BTreeMap::new(),
    }
  }

  /// Attach a metadata entry.
  pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.metadata.insert(key.into(), value.into());
    self
  }
}

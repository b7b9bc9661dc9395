//! The `CaseStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `rentwise-store-sqlite`). Agents and the API layer depend on this
//! abstraction, not on any concrete backend. The store is the only component
//! with write authority over a case.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::case::{Case, CaseCategory, CaseStatus, NewCase};

// ─── Summary type ────────────────────────────────────────────────────────────

/// Lightweight row returned by [`CaseStore::list_cases`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
  pub case_id:    Uuid,
  pub category:   CaseCategory,
  pub status:     CaseStatus,
  pub created_at: DateTime<Utc>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Rentwise case store backend.
///
/// Consistency contract:
/// - `create_case` is the only operation that creates a case and assigns its
///   id; ids are never reused.
/// - Mutations against the same case serialize: `update_case` applies the
///   mutator atomically (all-or-nothing) against the latest committed state,
///   so concurrent agent calls produce a deterministic event order and a
///   single coherent final status.
/// - The timeline is append-only. A mutator that truncates or rewrites
///   existing events is rejected.
/// - `case_id` and `created_at` are identity fields; mutators must not touch
///   them.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create and persist a new case with status `intake`, recording the seed
  /// events from `input` atomically with creation.
  fn create_case(
    &self,
    input: NewCase,
  ) -> impl Future<Output = Result<Case, Self::Error>> + Send + '_;

  /// Retrieve a case by id. Returns `None` if not found.
  fn get_case(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + '_;

  /// List all cases, newest first.
  fn list_cases(
    &self,
  ) -> impl Future<Output = Result<Vec<CaseSummary>, Self::Error>> + Send + '_;

  /// Apply an atomic mutation to a case and return the committed state.
  ///
  /// The mutator runs against the latest committed snapshot. If it returns an
  /// error the case is left untouched. New tail events and new documents are
  /// persisted; `law_citations` is persisted wholesale, which gives
  /// replace-not-merge semantics for re-runs of the reasoner.
  ///
  /// Fails with the backend's case-not-found error for unknown ids.
  fn update_case<F>(
    &self,
    id: Uuid,
    mutate: F,
  ) -> impl Future<Output = Result<Case, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut Case) -> crate::Result<()> + Send + 'static;
}

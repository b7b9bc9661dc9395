//! JSON REST API for Rentwise.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rentwise_core::store::CaseStore`]. Transport concerns (TLS, tracing
//! layers, the health probe) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rentwise_api::api_router(state))
//! ```

pub mod cases;
pub mod error;
pub mod search;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rentwise_agents::{Generator, drafter::DrafterConfig};
use rentwise_core::store::CaseStore;
use rentwise_law::LawIndex;

pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  pub law:       Arc<LawIndex>,
  pub generator: Arc<Generator>,
  pub drafter:   DrafterConfig,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      law:       Arc::clone(&self.law),
      generator: Arc::clone(&self.generator),
      drafter:   self.drafter.clone(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: CaseStore + 'static,
{
  Router::new()
    // Cases & the agent pipeline
    .route("/intake", post(cases::intake::<S>))
    .route("/cases", get(cases::list::<S>))
    .route("/cases/{id}", get(cases::get_one::<S>))
    .route("/cases/{id}/reason", post(cases::reason::<S>))
    .route("/cases/{id}/draft", post(cases::draft_one::<S>))
    .route("/cases/{id}/escalate", post(cases::escalate_one::<S>))
    .route("/cases/{id}/documents/{doc_id}", get(cases::get_document::<S>))
    // Law search
    .route("/law/search", get(search::handler::<S>))
    .with_state(state)
}

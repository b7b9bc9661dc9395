//! Handlers for `/intake` and `/cases` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/intake` | Body: [`IntakeRequest`]; returns 201 + case summary |
//! | `GET`  | `/cases` | Case summaries, newest first |
//! | `GET`  | `/cases/:id` | Full case view |
//! | `POST` | `/cases/:id/reason` | Optional body: `{"anchor_date":"..."}` |
//! | `POST` | `/cases/:id/draft` | Body: [`DraftBody`] |
//! | `POST` | `/cases/:id/escalate` | Body: [`EscalateBody`] |
//! | `GET`  | `/cases/:id/documents/:doc_id` | Stored document content |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use rentwise_agents::{drafter, escalation, intake as intake_agent, reasoner};
use rentwise_agents::intake::IntakeRequest;
use rentwise_core::{
  case::{Case, CaseCategory, CaseStatus},
  store::{CaseStore, CaseSummary},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

fn internal<E>(e: E) -> ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  ApiError::Internal(Box::new(e))
}

// ─── Intake ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct IntakeSummary {
  pub case_id:     Uuid,
  pub category:    CaseCategory,
  pub subcategory: Option<String>,
  pub risk_flags:  Vec<String>,
  pub status:      CaseStatus,
}

impl From<&Case> for IntakeSummary {
  fn from(case: &Case) -> Self {
    Self {
      case_id:     case.case_id,
      category:    case.facts.category,
      subcategory: case.facts.subcategory.clone(),
      risk_flags:  case.facts.risk_flags.iter().cloned().collect(),
      status:      case.status,
    }
  }
}

/// `POST /intake` — returns 201 + the new case summary.
pub async fn intake<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<IntakeRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + 'static,
{
  let case = intake_agent::intake(&*state.store, body).await?;
  Ok((StatusCode::CREATED, Json(IntakeSummary::from(&case))))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /cases`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<CaseSummary>>, ApiError>
where
  S: CaseStore + 'static,
{
  let summaries = state.store.list_cases().await.map_err(internal)?;
  Ok(Json(summaries))
}

/// `GET /cases/:id` — the full case view.
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Case>, ApiError>
where
  S: CaseStore + 'static,
{
  let case = state
    .store
    .get_case(id)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::NotFound(format!("case {id} not found")))?;
  Ok(Json(case))
}

// ─── Reasoning ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReasonBody {
  /// Overrides the deadline anchor; defaults to the intake date.
  pub anchor_date: Option<NaiveDate>,
}

/// `POST /cases/:id/reason` — body optional.
pub async fn reason<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  body: Option<Json<ReasonBody>>,
) -> Result<Json<reasoner::ReasoningResult>, ApiError>
where
  S: CaseStore + 'static,
{
  let anchor = body.and_then(|Json(b)| b.anchor_date);
  let result =
    reasoner::reason(&*state.store, &state.law, &state.generator, id, anchor)
      .await?;
  Ok(Json(result))
}

// ─── Drafting ────────────────────────────────────────────────────────────────

fn default_channel() -> String {
  "docx".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DraftBody {
  pub template: String,
  #[serde(default = "default_channel")]
  pub channel:  String,
}

#[derive(Debug, Serialize)]
pub struct DraftSummary {
  pub document_id:     Uuid,
  pub urls:            BTreeMap<String, String>,
  pub preview_subject: String,
  pub preview_body:    String,
}

/// `POST /cases/:id/draft`
pub async fn draft_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<DraftBody>,
) -> Result<Json<DraftSummary>, ApiError>
where
  S: CaseStore + 'static,
{
  let outcome = drafter::draft(
    &*state.store,
    &state.generator,
    &state.drafter,
    id,
    &body.template,
    &body.channel,
  )
  .await?;

  Ok(Json(DraftSummary {
    document_id:     outcome.document.document_id,
    urls:            outcome.document.urls.clone(),
    preview_subject: outcome.preview_subject,
    preview_body:    outcome.preview_body,
  }))
}

// ─── Escalation ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EscalateBody {
  pub target:               String,
  #[serde(default)]
  pub include_cover_letter: bool,
}

/// `POST /cases/:id/escalate`
pub async fn escalate_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EscalateBody>,
) -> Result<Json<escalation::EscalationPlan>, ApiError>
where
  S: CaseStore + 'static,
{
  let plan = escalation::escalate(
    &*state.store,
    &state.generator,
    &state.drafter,
    id,
    &body.target,
    body.include_cover_letter,
  )
  .await?;
  Ok(Json(plan))
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DocumentView {
  pub document_id:  Uuid,
  pub doc_type:     String,
  pub filename:     String,
  pub created_at:   DateTime<Utc>,
  pub content_hash: String,
  pub urls:         BTreeMap<String, String>,
  pub subject:      Option<String>,
  pub body:         Option<String>,
}

/// `GET /cases/:id/documents/:doc_id` — downloadable document content.
pub async fn get_document<S>(
  State(state): State<ApiState<S>>,
  Path((id, doc_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DocumentView>, ApiError>
where
  S: CaseStore + 'static,
{
  let case = state
    .store
    .get_case(id)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiError::NotFound(format!("case {id} not found")))?;

  let document = case
    .documents
    .get(&doc_id)
    .ok_or_else(|| ApiError::NotFound(format!("document {doc_id} not found")))?;

  Ok(Json(DocumentView {
    document_id:  document.document_id,
    doc_type:     document.doc_type.clone(),
    filename:     document.filename.clone(),
    created_at:   document.created_at,
    content_hash: document.content_hash.clone(),
    urls:         document.urls.clone(),
    subject:      document.subject().map(str::to_string),
    body:         document.body().map(str::to_string),
  }))
}

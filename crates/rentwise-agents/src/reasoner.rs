//! Reasoner agent: combines case facts with retrieved snippets into a
//! plain-English explanation, ordered action steps, deadlines, and citations.
//!
//! The output is a pure function of the case facts and the knowledge corpus,
//! so re-running reasoning reproduces the same citations and explanation.
//! Each run still appends a fresh timeline event; the audit trail is
//! deliberately not idempotent.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use rentwise_core::{
  case::{CaseCategory, CaseFacts, CaseStatus, Citation},
  event::TimelineEvent,
  store::CaseStore,
};
use rentwise_law::{LawIndex, Scored};

use crate::{
  Error,
  error::store_error,
  generate::{Generator, PromptKind, refine},
  scheduler::{self, Deadline},
};

/// How many snippets ground one reasoning run.
pub const RETRIEVAL_TOP_K: usize = 4;

// ─── Output ──────────────────────────────────────────────────────────────────

/// One plain-language action step, traceable to zero or more sources.
#[derive(Debug, Clone, Serialize)]
pub struct ActionStep {
  pub text:        String,
  pub source_urls: Vec<String>,
}

/// The reasoning artefacts returned to the caller and summarised onto the
/// case.
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningResult {
  pub explanation_plain: String,
  pub steps:             Vec<ActionStep>,
  pub deadlines:         Vec<Deadline>,
  pub law_citations:     Vec<Citation>,
  pub as_of:             NaiveDate,
}

// ─── Composition ─────────────────────────────────────────────────────────────

fn build_query(facts: &CaseFacts) -> String {
  let mut query = facts.issue.clone();
  if let Some(description) = &facts.description {
    query.push(' ');
    query.push_str(description);
  }
  for flag in &facts.risk_flags {
    query.push(' ');
    query.push_str(&flag.replace('_', " "));
  }
  query
}

/// Category-specific opening actions; citation-free by construction.
fn category_script(category: CaseCategory) -> &'static [&'static str] {
  match category {
    CaseCategory::RepairsUrgent => &[
      "Tell the rental provider in writing that the repair is urgent and ask \
       for immediate action.",
      "Keep records of every call, message, and receipt about the fault.",
    ],
    CaseCategory::RepairsNonurgent => &[
      "Send the rental provider a written repair request and keep a copy.",
      "Diarise the 14-day completion window from the date of your request.",
    ],
    CaseCategory::RentIncrease => &[
      "Check the notice period and the date of the last increase.",
      "Compare the new rent with similar properties in your area.",
    ],
    CaseCategory::NoticeToVacate => &[
      "Check the notice against the allowable grounds and minimum periods.",
      "Get advice before moving out; an invalid notice can be challenged.",
    ],
    CaseCategory::Bond => &[
      "Collect the condition report and photos from when you moved in.",
      "Respond to any bond claim in writing before the deadline.",
    ],
    CaseCategory::MinStandards => &[
      "List each standard the property fails to meet.",
      "Ask the rental provider in writing to bring the property up to \
       standard.",
    ],
    CaseCategory::EntryRights => &[
      "Note the dates and times of each entry or entry notice.",
      "Object in writing if notice requirements were not followed.",
    ],
    CaseCategory::Other => &[
      "Write down a timeline of what has happened so far.",
      "Gather any letters, photos, or receipts related to the issue.",
    ],
  }
}

fn compose_steps(category: CaseCategory, hits: &[Scored<'_>]) -> Vec<ActionStep> {
  let mut steps: Vec<ActionStep> = category_script(category)
    .iter()
    .map(|text| ActionStep { text: (*text).to_string(), source_urls: Vec::new() })
    .collect();

  for hit in hits {
    let citation = hit.snippet.citation();
    steps.push(ActionStep {
      text:        citation.point,
      source_urls: vec![citation.url],
    });
  }
  steps
}

fn compose_explanation(facts: &CaseFacts, citations: &[Citation]) -> String {
  let mut text = format!(
    "Your case looks like {} under Victorian renting law.",
    facts.category.label()
  );
  if citations.is_empty() {
    text.push_str(
      " We could not match your issue to a specific official source, so the \
       steps below are general guidance.",
    );
    return text;
  }

  text.push_str("\n\nWhat the official guidance says:");
  for citation in citations {
    text.push_str(&format!(
      "\n- {} ({}, as of {})",
      citation.point, citation.url, citation.as_of
    ));
  }
  text
}

// ─── Agent ───────────────────────────────────────────────────────────────────

/// Run reasoning against a case.
///
/// Deadlines anchor to `anchor` when supplied, otherwise to the intake date.
/// On success the case carries the new citations (replacing any prior set),
/// the explanation summary, an updated critical deadline, a fresh timeline
/// event, and a status of at least `reasoned`.
pub async fn reason<S>(
  store: &S,
  law: &LawIndex,
  generator: &Generator,
  case_id: Uuid,
  anchor: Option<NaiveDate>,
) -> Result<ReasoningResult, Error>
where
  S: CaseStore,
{
  let case = store
    .get_case(case_id)
    .await
    .map_err(store_error)?
    .ok_or(Error::CaseNotFound(case_id))?;

  let query = build_query(&case.facts);
  let hits = law.retrieve(&query, Some(case.facts.category), RETRIEVAL_TOP_K);

  let law_citations: Vec<Citation> =
    hits.iter().map(|hit| hit.snippet.citation()).collect();
  let steps = compose_steps(case.facts.category, &hits);

  let anchor = anchor.unwrap_or_else(|| case.created_at.date_naive());
  let deadlines = scheduler::compute_deadlines(case.facts.category, anchor);

  let composed = compose_explanation(&case.facts, &law_citations);
  let explanation_plain = refine(
    generator,
    PromptKind::Reasoner,
    "You explain Victorian renting law in plain English. Only use the \
     supplied guidance; keep every citation URL.",
    &composed,
    composed.clone(),
  )
  .await;

  let result = ReasoningResult {
    explanation_plain,
    steps,
    deadlines,
    law_citations,
    as_of: anchor,
  };

  let citations = result.law_citations.clone();
  let summary = result.explanation_plain.clone();
  let earliest = result.deadlines.iter().map(|d| d.due_date).min();
  let step_count = result.steps.len();
  let citation_count = result.law_citations.len();

  store
    .update_case(case_id, move |case| {
      case.law_citations = citations;
      case.recommendation = Some(summary);
      if let Some(due) = earliest {
        case.critical_deadline = Some(due);
      }
      case.advance_status(CaseStatus::Reasoned);
      case.record_event(
        TimelineEvent::now("Reasoning generated")
          .meta("step_count", step_count.to_string())
          .meta("citation_count", citation_count.to_string()),
      );
      Ok(())
    })
    .await
    .map_err(store_error)?;

  Ok(result)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use rentwise_core::case::Renter;
  use rentwise_law::builtin_corpus;
  use rentwise_store_sqlite::SqliteStore;

  use super::*;
  use crate::intake::{self, IntakeRequest};

  async fn fixture() -> (SqliteStore, LawIndex, Generator, Uuid) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let law = LawIndex::new(builtin_corpus());
    let generator = Generator::offline();
    let case = intake::intake(&store, IntakeRequest {
      renter:        Renter::named("Ada Tenant"),
      provider:      None,
      issue:         "repairs".into(),
      free_text:     Some("no hot water for 5 days".into()),
      answers:       BTreeMap::new(),
      evidence_urls: Vec::new(),
    })
    .await
    .unwrap();
    let case_id = case.case_id;
    (store, law, generator, case_id)
  }

  #[tokio::test]
  async fn reasoning_produces_citations_and_deadlines() {
    let (store, law, generator, case_id) = fixture().await;

    let result = reason(&store, &law, &generator, case_id, None).await.unwrap();

    assert!(!result.law_citations.is_empty());
    assert!(!result.law_citations[0].point.is_empty());
    assert!(result.law_citations[0].url.contains("repairs"));
    assert!(!result.deadlines.is_empty());

    let case = store.get_case(case_id).await.unwrap().unwrap();
    assert!(result.deadlines.iter().all(|d| d.due_date > case.created_at.date_naive()));
    assert_eq!(case.status, CaseStatus::Reasoned);
    assert_eq!(case.law_citations, result.law_citations);
    assert!(case.recommendation.is_some());
  }

  #[tokio::test]
  async fn rerunning_reasoning_is_idempotent_except_for_events() {
    let (store, law, generator, case_id) = fixture().await;

    let first = reason(&store, &law, &generator, case_id, None).await.unwrap();
    let events_after_first =
      store.get_case(case_id).await.unwrap().unwrap().events.len();

    let second = reason(&store, &law, &generator, case_id, None).await.unwrap();
    let case = store.get_case(case_id).await.unwrap().unwrap();

    assert_eq!(first.law_citations, second.law_citations);
    assert_eq!(first.explanation_plain, second.explanation_plain);
    // Citations replaced, not merged.
    assert_eq!(case.law_citations, second.law_citations);
    // Audit trail grows by exactly one per run.
    assert_eq!(case.events.len(), events_after_first + 1);
  }

  #[tokio::test]
  async fn unknown_case_fails_with_not_found() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let law = LawIndex::new(builtin_corpus());
    let generator = Generator::offline();

    let err = reason(&store, &law, &generator, Uuid::new_v4(), None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::CaseNotFound(_)));
  }

  #[tokio::test]
  async fn other_category_falls_back_to_generic_guidance() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let law = LawIndex::new(builtin_corpus());
    let generator = Generator::offline();
    let case = intake::intake(&store, IntakeRequest {
      renter:        Renter::named("Ada Tenant"),
      provider:      None,
      issue:         "zzz unrelated xyz".into(),
      free_text:     None,
      answers:       BTreeMap::new(),
      evidence_urls: Vec::new(),
    })
    .await
    .unwrap();

    let result = reason(&store, &law, &generator, case.case_id, None)
      .await
      .unwrap();
    assert!(!result.steps.is_empty());
    assert!(result.explanation_plain.contains("general guidance"));
  }
}

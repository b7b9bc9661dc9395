//! Intake agent: rule-based classification of raw renter input into a new
//! case.
//!
//! Classification is keyword matching over fixed rule tables: reproducible,
//! testable, and free of natural-language machinery. Unmatched input lands in
//! [`CaseCategory::Other`]; intake never fails on content.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::Deserialize;

use rentwise_core::{
  case::{Case, CaseCategory, CaseFacts, NewCase, Provider, Renter},
  event::TimelineEvent,
  store::CaseStore,
};

use crate::{error::store_error, scheduler};

// ─── Request ─────────────────────────────────────────────────────────────────

/// Raw renter input, as received from the intake form.
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeRequest {
  pub renter:        Renter,
  #[serde(default)]
  pub provider:      Option<Provider>,
  /// Primary issue description selected or typed by the renter.
  pub issue:         String,
  #[serde(default)]
  pub free_text:     Option<String>,
  #[serde(default)]
  pub answers:       BTreeMap<String, String>,
  #[serde(default)]
  pub evidence_urls: Vec<String>,
}

// ─── Rule tables ─────────────────────────────────────────────────────────────

/// First matching category wins; order is priority.
const CATEGORY_RULES: &[(CaseCategory, &[&str])] = &[
  (
    CaseCategory::RepairsUrgent,
    &[
      "urgent", "no hot water", "hot water", "gas leak", "no heating",
      "electrical fault", "flooding", "serious leak", "sewage",
    ],
  ),
  (
    CaseCategory::RentIncrease,
    &["rent increase", "increase the rent", "rent went up", "raise the rent"],
  ),
  (
    CaseCategory::NoticeToVacate,
    &["notice to vacate", "evict", "vacate", "termination notice"],
  ),
  (CaseCategory::Bond, &["bond", "deposit claim"]),
  (
    CaseCategory::MinStandards,
    &["minimum standard", "no heater", "window covering", "deadlock", "ventilation"],
  ),
  (
    CaseCategory::EntryRights,
    &["entry without", "entered without", "inspection notice", "privacy"],
  ),
  (
    CaseCategory::RepairsNonurgent,
    &["repair", "broken", "not working", "mould", "leak", "damage"],
  ),
];

pub(crate) const URGENT_REPAIR_FLAG: &str = "urgent_repair";

/// Flag name → trigger keywords. Flags are additive; the result is a set.
const RISK_RULES: &[(&str, &[&str])] = &[
  (
    URGENT_REPAIR_FLAG,
    &[
      "urgent", "no hot water", "hot water", "gas leak", "no heating",
      "electrical fault", "flooding", "sewage",
    ],
  ),
  (
    "retaliation_risk",
    &["retaliat", "revenge", "because i complained", "threatened to evict"],
  ),
  (
    "safety_hazard",
    &["unsafe", "danger", "hazard", "asbestos", "exposed wiring", "carbon monoxide"],
  ),
  (
    "family_violence",
    &["family violence", "domestic violence", "intervention order"],
  ),
  ("health_risk", &["mould", "mold", "asthma", "making me sick"]),
];

// ─── Classification ──────────────────────────────────────────────────────────

fn classify(text: &str) -> CaseCategory {
  CATEGORY_RULES
    .iter()
    .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
    .map(|(category, _)| *category)
    .unwrap_or(CaseCategory::Other)
}

fn derive_risk_flags(text: &str) -> BTreeSet<String> {
  RISK_RULES
    .iter()
    .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
    .map(|(flag, _)| (*flag).to_string())
    .collect()
}

fn classified_facts(request: &IntakeRequest) -> CaseFacts {
  let mut combined = request.issue.to_lowercase();
  if let Some(free_text) = &request.free_text {
    combined.push(' ');
    combined.push_str(&free_text.to_lowercase());
  }
  for value in request.answers.values() {
    combined.push(' ');
    combined.push_str(&value.to_lowercase());
  }

  let mut category = classify(&combined);
  let risk_flags = derive_risk_flags(&combined);

  // A non-urgent classification with an urgent-repair signal is upgraded.
  if category == CaseCategory::RepairsNonurgent
    && risk_flags.contains(URGENT_REPAIR_FLAG)
  {
    category = CaseCategory::RepairsUrgent;
  }

  CaseFacts {
    category,
    subcategory: request.answers.get("subcategory").cloned(),
    issue: request.issue.clone(),
    description: request.free_text.clone(),
    answers: request.answers.clone(),
    evidence_urls: request.evidence_urls.clone(),
    risk_flags,
  }
}

// ─── Agent ───────────────────────────────────────────────────────────────────

/// Classify raw intake input and create exactly one new case.
///
/// This is the only operation that creates a case. The initial critical
/// deadline comes from the scheduler's earliest rule for the classified
/// category; the "Case created" event is recorded atomically with creation.
pub async fn intake<S>(store: &S, request: IntakeRequest) -> Result<Case, crate::Error>
where
  S: CaseStore,
{
  let facts = classified_facts(&request);

  let deadlines =
    scheduler::compute_deadlines(facts.category, Utc::now().date_naive());
  let critical_deadline = deadlines.iter().map(|d| d.due_date).min();

  let event =
    TimelineEvent::now("Case created").meta("category", facts.category.as_str());

  store
    .create_case(NewCase {
      renter: request.renter,
      provider: request.provider,
      facts,
      critical_deadline,
      events: vec![event],
    })
    .await
    .map_err(store_error)
}

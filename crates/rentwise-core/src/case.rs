//! Case — the aggregate root of the renter pipeline.
//!
//! A case collects everything the agents know and produce about one renter
//! issue: classified facts, the latest reasoning output, generated documents,
//! and an append-only timeline. All mutation flows through the
//! [`CaseStore`](crate::store::CaseStore); agents themselves hold no state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, document::Document, event::TimelineEvent};

// ─── Category ────────────────────────────────────────────────────────────────

/// High-level issue classifications supported by the intake rules.
///
/// Unmatched input always classifies as [`Other`](CaseCategory::Other);
/// classification never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
  RepairsUrgent,
  RepairsNonurgent,
  RentIncrease,
  NoticeToVacate,
  Bond,
  MinStandards,
  EntryRights,
  Other,
}

impl CaseCategory {
  /// Every category, in intake rule-priority order.
  pub const ALL: [CaseCategory; 8] = [
    CaseCategory::RepairsUrgent,
    CaseCategory::RepairsNonurgent,
    CaseCategory::RentIncrease,
    CaseCategory::NoticeToVacate,
    CaseCategory::Bond,
    CaseCategory::MinStandards,
    CaseCategory::EntryRights,
    CaseCategory::Other,
  ];

  /// The wire/storage discriminant. Must match the serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::RepairsUrgent => "repairs_urgent",
      Self::RepairsNonurgent => "repairs_nonurgent",
      Self::RentIncrease => "rent_increase",
      Self::NoticeToVacate => "notice_to_vacate",
      Self::Bond => "bond",
      Self::MinStandards => "min_standards",
      Self::EntryRights => "entry_rights",
      Self::Other => "other",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| Error::UnknownCategory(s.to_string()))
  }

  /// Short human-readable phrase used in explanations and letters.
  pub fn label(&self) -> &'static str {
    match self {
      Self::RepairsUrgent => "urgent repairs",
      Self::RepairsNonurgent => "non-urgent repairs",
      Self::RentIncrease => "a rent increase",
      Self::NoticeToVacate => "a notice to vacate",
      Self::Bond => "a bond dispute",
      Self::MinStandards => "minimum rental standards",
      Self::EntryRights => "entry and privacy rights",
      Self::Other => "a rental issue",
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle stage of a case. Transitions are monotonic: re-running an
/// earlier agent never moves the status backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
  Intake,
  Reasoned,
  Drafted,
  Escalated,
  Closed,
}

impl CaseStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Intake => "intake",
      Self::Reasoned => "reasoned",
      Self::Drafted => "drafted",
      Self::Escalated => "escalated",
      Self::Closed => "closed",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "intake" => Ok(Self::Intake),
      "reasoned" => Ok(Self::Reasoned),
      "drafted" => Ok(Self::Drafted),
      "escalated" => Ok(Self::Escalated),
      "closed" => Ok(Self::Closed),
      other => Err(Error::UnknownStatus(other.to_string())),
    }
  }

  fn rank(&self) -> u8 {
    match self {
      Self::Intake => 0,
      Self::Reasoned => 1,
      Self::Drafted => 2,
      Self::Escalated => 3,
      Self::Closed => 4,
    }
  }
}

// ─── Parties ─────────────────────────────────────────────────────────────────

/// The renter the case belongs to. Only the full name is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Renter {
  pub full_name: String,
  pub email:     Option<String>,
  pub phone:     Option<String>,
  pub address:   Option<String>,
}

impl Renter {
  pub fn named(full_name: impl Into<String>) -> Self {
    Self {
      full_name: full_name.into(),
      email:     None,
      phone:     None,
      address:   None,
    }
  }
}

/// The rental provider (or their agent), when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
  pub name:       String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub agent_name: Option<String>,
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// The classified facts of a case, produced once by intake.
///
/// `risk_flags` is a set: flags are additive and order-independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFacts {
  pub category:      CaseCategory,
  pub subcategory:   Option<String>,
  /// Primary issue description selected or typed by the renter.
  pub issue:         String,
  /// Optional free-text elaboration.
  pub description:   Option<String>,
  /// Structured intake answers, keyed by question id.
  pub answers:       BTreeMap<String, String>,
  pub evidence_urls: Vec<String>,
  pub risk_flags:    BTreeSet<String>,
}

// ─── Citation ────────────────────────────────────────────────────────────────

/// A pointer from generated output back to a knowledge snippet.
/// Always derived, never free-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
  /// Short legal proposition the cited source supports.
  pub point: String,
  pub url:   String,
  pub as_of: NaiveDate,
}

// ─── Case ────────────────────────────────────────────────────────────────────

/// The aggregate record of one renter's issue and all agent-produced
/// artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
  /// Assigned exactly once at creation; never reused.
  pub case_id:           Uuid,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
  pub renter:            Renter,
  pub provider:          Option<Provider>,
  pub facts:             CaseFacts,
  pub status:            CaseStatus,
  pub critical_deadline: Option<NaiveDate>,
  /// Latest plain-English summary written by the reasoner.
  pub recommendation:    Option<String>,
  /// Most recent citation set; replaced wholesale on each reasoning run.
  pub law_citations:     Vec<Citation>,
  pub documents:         BTreeMap<Uuid, Document>,
  /// Append-only timeline; insertion order is the source of truth.
  pub events:            Vec<TimelineEvent>,
}

impl Case {
  /// Move the status forward. A target at or below the current rank is a
  /// no-op, so re-running an earlier agent never reverts progress.
  pub fn advance_status(&mut self, to: CaseStatus) {
    if to.rank() > self.status.rank() {
      self.status = to;
    }
  }

  pub fn record_event(&mut self, event: TimelineEvent) {
    self.events.push(event);
  }
}

// ─── NewCase ─────────────────────────────────────────────────────────────────

/// Input to [`CaseStore::create_case`](crate::store::CaseStore::create_case).
/// The store assigns `case_id`, timestamps, and the `intake` status.
#[derive(Debug, Clone)]
pub struct NewCase {
  pub renter:            Renter,
  pub provider:          Option<Provider>,
  pub facts:             CaseFacts,
  pub critical_deadline: Option<NaiveDate>,
  /// Seed timeline entries recorded atomically with creation.
  pub events:            Vec<TimelineEvent>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_discriminants_roundtrip() {
    for category in CaseCategory::ALL {
      assert_eq!(CaseCategory::parse(category.as_str()).unwrap(), category);
    }
    assert!(matches!(
      CaseCategory::parse("weird"),
      Err(Error::UnknownCategory(_))
    ));
  }

  #[test]
  fn status_never_moves_backward() {
    let mut case = sample_case();
    case.advance_status(CaseStatus::Drafted);
    assert_eq!(case.status, CaseStatus::Drafted);

    case.advance_status(CaseStatus::Reasoned);
    assert_eq!(case.status, CaseStatus::Drafted);

    case.advance_status(CaseStatus::Escalated);
    assert_eq!(case.status, CaseStatus::Escalated);
  }

  fn sample_case() -> Case {
    Case {
      case_id:           Uuid::new_v4(),
      created_at:        Utc::now(),
      updated_at:        Utc::now(),
      renter:            Renter::named("Ada Tenant"),
      provider:          None,
      facts:             CaseFacts {
        category:      CaseCategory::RepairsUrgent,
        subcategory:   None,
        issue:         "no hot water".into(),
        description:   None,
        answers:       BTreeMap::new(),
        evidence_urls: Vec::new(),
        risk_flags:    BTreeSet::new(),
      },
      status:            CaseStatus::Intake,
      critical_deadline: None,
      recommendation:    None,
      law_citations:     Vec::new(),
      documents:         BTreeMap::new(),
      events:            Vec::new(),
    }
  }
}

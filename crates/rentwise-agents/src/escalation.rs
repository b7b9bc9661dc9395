//! Escalation agent: venue-specific checklists, forms, and fee guidance,
//! with an optional cover letter drafted through the drafter contract.

use serde::Serialize;
use uuid::Uuid;

use rentwise_core::{
  case::{CaseCategory, CaseStatus},
  event::TimelineEvent,
  store::CaseStore,
};

use crate::{
  Error,
  drafter::{self, DrafterConfig},
  error::store_error,
  generate::Generator,
};

// ─── Targets ─────────────────────────────────────────────────────────────────

/// Venues a case can be escalated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTarget {
  Vcat,
  Rdrv,
  ConsumerAffairs,
}

impl EscalationTarget {
  pub fn parse(s: &str) -> Result<Self, Error> {
    match s {
      "vcat" => Ok(Self::Vcat),
      "rdrv" => Ok(Self::Rdrv),
      "consumer_affairs" => Ok(Self::ConsumerAffairs),
      other => Err(Error::UnknownTarget(other.to_string())),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Vcat => "vcat",
      Self::Rdrv => "rdrv",
      Self::ConsumerAffairs => "consumer_affairs",
    }
  }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct EscalationPlan {
  pub checklist:                Vec<String>,
  pub forms_list:               Vec<String>,
  pub fee_link:                 String,
  pub cover_letter_document_id: Option<Uuid>,
}

// ─── Lookup tables ───────────────────────────────────────────────────────────

fn checklist(target: EscalationTarget, category: CaseCategory) -> Vec<String> {
  let mut items = vec![
    "Review all communications and evidence gathered so far.".to_string(),
    "Prepare supporting documents such as invoices, notices, and \
     photographs."
      .to_string(),
    "Confirm the statutory timelines are still open before submitting."
      .to_string(),
  ];
  match target {
    EscalationTarget::Vcat => items.push(
      "Check the correct VCAT list for your application and whether a fee \
       waiver applies."
        .to_string(),
    ),
    EscalationTarget::Rdrv => items.push(
      "Confirm the dispute is about repairs or minimum standards, the lists \
       RDRV handles."
        .to_string(),
    ),
    EscalationTarget::ConsumerAffairs => items.push(
      "Have your rental agreement and the disputed notice ready for the \
       assessment request."
        .to_string(),
    ),
  }
  if matches!(
    category,
    CaseCategory::RepairsUrgent | CaseCategory::RepairsNonurgent
  ) {
    items.push(
      "Include receipts for any repairs you have already paid for."
        .to_string(),
    );
  }
  items
}

fn forms(target: EscalationTarget, category: CaseCategory) -> Vec<String> {
  match target {
    EscalationTarget::Vcat => {
      vec!["VCAT renting application form".to_string()]
    }
    EscalationTarget::Rdrv => vec!["RDRV repair dispute form".to_string()],
    EscalationTarget::ConsumerAffairs => match category {
      CaseCategory::RentIncrease => {
        vec!["CAV rent assessment request form".to_string()]
      }
      _ => vec!["CAV renting complaint form".to_string()],
    },
  }
}

fn fee_link(target: EscalationTarget) -> &'static str {
  match target {
    EscalationTarget::Vcat | EscalationTarget::Rdrv => {
      "https://www.vcat.vic.gov.au/fees"
    }
    EscalationTarget::ConsumerAffairs => {
      "https://www.consumer.vic.gov.au/housing/renting/rent-bond-bills-and-condition-reports/rent/rent-increases"
    }
  }
}

// ─── Agent ───────────────────────────────────────────────────────────────────

/// Build the escalation plan for a case.
///
/// The target is validated before anything else: an unknown target fails
/// without touching the case. With `include_cover_letter`, the drafter is
/// invoked internally and its usual side effects apply (new document plus
/// its own timeline event).
pub async fn escalate<S>(
  store: &S,
  generator: &Generator,
  drafter_config: &DrafterConfig,
  case_id: Uuid,
  target: &str,
  include_cover_letter: bool,
) -> Result<EscalationPlan, Error>
where
  S: CaseStore,
{
  let target = EscalationTarget::parse(target)?;

  let case = store
    .get_case(case_id)
    .await
    .map_err(store_error)?
    .ok_or(Error::CaseNotFound(case_id))?;
  let category = case.facts.category;

  let cover_letter_document_id = if include_cover_letter {
    let outcome = drafter::draft(
      store,
      generator,
      drafter_config,
      case_id,
      "escalation_cover",
      "text",
    )
    .await?;
    Some(outcome.document.document_id)
  } else {
    None
  };

  store
    .update_case(case_id, move |case| {
      case.advance_status(CaseStatus::Escalated);
      case.record_event(
        TimelineEvent::now("Escalation guidance").meta("target", target.as_str()),
      );
      Ok(())
    })
    .await
    .map_err(store_error)?;

  Ok(EscalationPlan {
    checklist: checklist(target, category),
    forms_list: forms(target, category),
    fee_link: fee_link(target).to_string(),
    cover_letter_document_id,
  })
}

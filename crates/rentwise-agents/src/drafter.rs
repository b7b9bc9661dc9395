//! Drafter agent: renders a letter or notice from a named template, persists
//! it as a new document, and records the work on the case timeline.
//!
//! Rendering merges case facts with the latest reasoning output when present;
//! drafting before reasoning still succeeds with those sections left out.
//! Documents are write-once; every call mints a fresh id.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use rentwise_core::{
  case::{Case, CaseStatus},
  document::Document,
  event::TimelineEvent,
  store::CaseStore,
};

use crate::{
  Error,
  error::store_error,
  generate::{Generator, PromptKind, refine},
};

// ─── Channels ────────────────────────────────────────────────────────────────

/// Output representation for a rendered document. `pdf` is a placeholder
/// rendering; all channels carry the same text body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
  Docx,
  Pdf,
  Text,
}

impl Channel {
  pub fn parse(s: &str) -> Result<Self, Error> {
    match s {
      "docx" => Ok(Self::Docx),
      "pdf" => Ok(Self::Pdf),
      "text" => Ok(Self::Text),
      other => Err(Error::UnsupportedChannel(other.to_string())),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Docx => "docx",
      Self::Pdf => "pdf",
      Self::Text => "text",
    }
  }

  fn extension(&self) -> &'static str {
    match self {
      Self::Docx => "docx",
      Self::Pdf => "pdf",
      Self::Text => "txt",
    }
  }
}

// ─── Templates ───────────────────────────────────────────────────────────────

struct Template {
  name:    &'static str,
  subject: &'static str,
  opening: &'static str,
}

const TEMPLATES: &[Template] = &[
  Template {
    name:    "repairs_urgent",
    subject: "Urgent repair request",
    opening: "I am writing to request urgent repairs at the property. Under \
              Consumer Affairs Victoria guidance, urgent repairs must be \
              arranged immediately. If I do not hear from you within 24 \
              hours I will arrange repairs up to $2,500 and expect \
              reimbursement within 7 days.",
  },
  Template {
    name:    "repairs_nonurgent",
    subject: "Repair request",
    opening: "I am writing to request repairs at the property. Non-urgent \
              repairs must be completed within 14 days of this written \
              request.",
  },
  Template {
    name:    "rent_increase",
    subject: "Response to proposed rent increase",
    opening: "I am writing about the proposed rent increase. Rent can \
              generally only increase once every 12 months and requires 60 \
              days' written notice on the prescribed form.",
  },
  Template {
    name:    "notice_to_vacate",
    subject: "Response to notice to vacate",
    opening: "I am writing about the notice to vacate I received. I am \
              checking the notice against the allowable grounds and minimum \
              notice periods before acting on it.",
  },
  Template {
    name:    "bond",
    subject: "Bond claim response",
    opening: "I am writing about the bond claim on my tenancy. I do not \
              agree with the claim as made and ask that the evidence be \
              reviewed before it proceeds.",
  },
  Template {
    name:    "min_standards",
    subject: "Minimum standards compliance request",
    opening: "I am writing to ask that the property be brought up to the \
              rental minimum standards, which apply to this agreement.",
  },
  Template {
    name:    "entry_rights",
    subject: "Entry notice objection",
    opening: "I am writing about entry to the property. Entry generally \
              requires proper written notice, and I object to entry that \
              does not meet those requirements.",
  },
  Template {
    name:    "escalation_cover",
    subject: "Application cover letter",
    opening: "Please find enclosed my application regarding an unresolved \
              rental matter. Earlier correspondence has not resolved the \
              issue, so I am escalating it.",
  },
];

fn find_template(name: &str) -> Option<&'static Template> {
  TEMPLATES.iter().find(|t| t.name == name)
}

// ─── Rendering ───────────────────────────────────────────────────────────────

fn render_body(template: &Template, case: &Case) -> String {
  let provider_name = case
    .provider
    .as_ref()
    .map(|p| p.name.as_str())
    .unwrap_or("Rental Provider");

  let mut body = format!("Dear {provider_name},\n\n{}\n", template.opening);

  body.push_str(&format!("\nThe issue: {}.\n", case.facts.issue.trim_end_matches('.')));
  if let Some(description) = &case.facts.description {
    body.push_str(&format!("Details: {}.\n", description.trim_end_matches('.')));
  }

  // Reasoning-derived sections; blank when drafting precedes reasoning.
  if let Some(recommendation) = &case.recommendation {
    body.push_str(&format!("\n{recommendation}\n"));
  }
  if !case.law_citations.is_empty() {
    body.push_str("\nRelevant guidance:\n");
    for citation in &case.law_citations {
      body.push_str(&format!("- {} ({})\n", citation.point, citation.url));
    }
  }

  body.push_str(&format!(
    "\nPlease respond in writing.\n\nRegards,\n{}\n",
    case.renter.full_name
  ));
  body
}

// ─── Config & outcome ────────────────────────────────────────────────────────

/// Where rendered documents are published.
#[derive(Debug, Clone)]
pub struct DrafterConfig {
  pub document_base_url: String,
}

impl Default for DrafterConfig {
  fn default() -> Self {
    Self { document_base_url: "https://example.invalid/documents".to_string() }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftOutcome {
  pub document:        Document,
  pub preview_subject: String,
  pub preview_body:    String,
}

// ─── Agent ───────────────────────────────────────────────────────────────────

/// Render `template` for a case over `channel` and persist the result as a
/// new document.
///
/// Template and channel are validated before any side effect; a rejected
/// draft leaves the case untouched.
pub async fn draft<S>(
  store: &S,
  generator: &Generator,
  config: &DrafterConfig,
  case_id: Uuid,
  template: &str,
  channel: &str,
) -> Result<DraftOutcome, Error>
where
  S: CaseStore,
{
  let template = find_template(template)
    .ok_or_else(|| Error::UnknownTemplate(template.to_string()))?;
  let channel = Channel::parse(channel)?;

  let case = store
    .get_case(case_id)
    .await
    .map_err(store_error)?
    .ok_or(Error::CaseNotFound(case_id))?;

  let composed = render_body(template, &case);
  let body = refine(
    generator,
    PromptKind::Drafter,
    "You draft respectful, legally accurate letters for Victorian rental \
     matters. Keep every statutory timeframe and citation URL.",
    &composed,
    composed.clone(),
  )
  .await;

  let document_id = Uuid::new_v4();
  let filename = format!("{}-{document_id}.{}", template.name, channel.extension());
  let content_hash = hex::encode(Sha256::digest(body.as_bytes()));
  let url = format!(
    "{}/{filename}",
    config.document_base_url.trim_end_matches('/')
  );

  let document = Document {
    document_id,
    doc_type: template.name.to_string(),
    filename,
    created_at: Utc::now(),
    content_hash,
    urls: BTreeMap::from([(channel.as_str().to_string(), url)]),
    metadata: BTreeMap::from([
      ("subject".to_string(), template.subject.to_string()),
      ("body".to_string(), body.clone()),
      ("channel".to_string(), channel.as_str().to_string()),
    ]),
  };

  let stored = document.clone();
  let template_name = template.name;
  store
    .update_case(case_id, move |case| {
      case.documents.insert(stored.document_id, stored);
      case.advance_status(CaseStatus::Drafted);
      case.record_event(
        TimelineEvent::now("Draft generated")
          .meta("document_id", document_id.to_string())
          .meta("template", template_name)
          .meta("channel", channel.as_str()),
      );
      Ok(())
    })
    .await
    .map_err(store_error)?;

  Ok(DraftOutcome {
    document,
    preview_subject: template.subject.to_string(),
    preview_body: body,
  })
}

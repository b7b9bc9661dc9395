//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! dates. Structured fields (parties, answers, risk flags, citations, urls,
//! metadata) are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rentwise_core::{
  case::{Case, CaseCategory, CaseFacts, CaseStatus, Citation, Provider, Renter},
  document::Document,
  event::TimelineEvent,
  store::CaseSummary,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_category(c: CaseCategory) -> &'static str { c.as_str() }

pub fn decode_category(s: &str) -> Result<CaseCategory> {
  Ok(CaseCategory::parse(s)?)
}

pub fn encode_status(s: CaseStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<CaseStatus> {
  Ok(CaseStatus::parse(s)?)
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `cases` row.
pub struct RawCase {
  pub case_id:            String,
  pub created_at:         String,
  pub updated_at:         String,
  pub status:             String,
  pub category:           String,
  pub subcategory:        Option<String>,
  pub issue:              String,
  pub description:        Option<String>,
  pub renter_json:        String,
  pub provider_json:      Option<String>,
  pub answers_json:       String,
  pub evidence_json:      String,
  pub risk_flags_json:    String,
  pub critical_deadline:  Option<String>,
  pub recommendation:     Option<String>,
  pub law_citations_json: String,
}

impl RawCase {
  /// Assemble the full aggregate from the case row plus its child rows.
  pub fn into_case(
    self,
    events: Vec<RawEvent>,
    documents: Vec<RawDocument>,
  ) -> Result<Case> {
    let renter: Renter = decode_json(&self.renter_json)?;
    let provider: Option<Provider> =
      self.provider_json.as_deref().map(decode_json).transpose()?;
    let law_citations: Vec<Citation> = decode_json(&self.law_citations_json)?;

    let facts = CaseFacts {
      category:      decode_category(&self.category)?,
      subcategory:   self.subcategory,
      issue:         self.issue,
      description:   self.description,
      answers:       decode_json(&self.answers_json)?,
      evidence_urls: decode_json(&self.evidence_json)?,
      risk_flags:    decode_json(&self.risk_flags_json)?,
    };

    let events = events
      .into_iter()
      .map(RawEvent::into_event)
      .collect::<Result<Vec<_>>>()?;

    let documents = documents
      .into_iter()
      .map(|raw| {
        let doc = raw.into_document()?;
        Ok((doc.document_id, doc))
      })
      .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(Case {
      case_id: decode_uuid(&self.case_id)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      renter,
      provider,
      facts,
      status: decode_status(&self.status)?,
      critical_deadline: self
        .critical_deadline
        .as_deref()
        .map(decode_date)
        .transpose()?,
      recommendation: self.recommendation,
      law_citations,
      documents,
      events,
    })
  }
}

/// Raw strings read directly from a `case_events` row.
pub struct RawEvent {
  pub occurred_at:   String,
  pub label:         String,
  pub metadata_json: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<TimelineEvent> {
    Ok(TimelineEvent {
      occurred_at: decode_dt(&self.occurred_at)?,
      label:       self.label,
      metadata:    decode_json(&self.metadata_json)?,
    })
  }
}

/// Raw strings read directly from a `case_documents` row.
pub struct RawDocument {
  pub document_id:   String,
  pub doc_type:      String,
  pub filename:      String,
  pub created_at:    String,
  pub content_hash:  String,
  pub urls_json:     String,
  pub metadata_json: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      document_id:  decode_uuid(&self.document_id)?,
      doc_type:     self.doc_type,
      filename:     self.filename,
      created_at:   decode_dt(&self.created_at)?,
      content_hash: self.content_hash,
      urls:         decode_json(&self.urls_json)?,
      metadata:     decode_json(&self.metadata_json)?,
    })
  }
}

/// Raw strings read for a `list_cases` summary row.
pub struct RawSummary {
  pub case_id:    String,
  pub category:   String,
  pub status:     String,
  pub created_at: String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<CaseSummary> {
    Ok(CaseSummary {
      case_id:    decode_uuid(&self.case_id)?,
      category:   decode_category(&self.category)?,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

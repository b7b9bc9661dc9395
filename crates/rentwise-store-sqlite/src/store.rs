//! [`SqliteStore`] — the SQLite implementation of [`CaseStore`].

use std::{
  collections::BTreeSet,
  path::Path,
};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use rentwise_core::{
  case::{Case, CaseStatus, NewCase},
  document::Document,
  event::TimelineEvent,
  store::{CaseStore, CaseSummary},
};

use crate::{
  Error, Result,
  encode::{
    RawCase, RawDocument, RawEvent, RawSummary, encode_category, encode_date,
    encode_dt, encode_json, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rentwise case store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// run on the connection's worker thread, so mutations serialize naturally;
/// each [`update_case`](CaseStore::update_case) is one `BEGIN IMMEDIATE`
/// transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  async fn create_case(&self, input: NewCase) -> Result<Case> {
    let now = Utc::now();
    let case = Case {
      case_id:           Uuid::new_v4(),
      created_at:        now,
      updated_at:        now,
      renter:            input.renter,
      provider:          input.provider,
      facts:             input.facts,
      status:            CaseStatus::Intake,
      critical_deadline: input.critical_deadline,
      recommendation:    None,
      law_citations:     Vec::new(),
      documents:         Default::default(),
      events:            input.events,
    };

    let stored = case.clone();
    self
      .conn
      .call(move |conn| Ok(insert_case(conn, &stored)))
      .await??;

    Ok(case)
  }

  async fn get_case(&self, id: Uuid) -> Result<Option<Case>> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| Ok(read_case(conn, &id_str)))
      .await?
  }

  async fn list_cases(&self) -> Result<Vec<CaseSummary>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT case_id, category, status, created_at
           FROM cases ORDER BY created_at DESC, case_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSummary {
              case_id:    row.get(0)?,
              category:   row.get(1)?,
              status:     row.get(2)?,
              created_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?
      .into_iter()
      .map(RawSummary::into_summary)
      .collect()
  }

  async fn update_case<F>(&self, id: Uuid, mutate: F) -> Result<Case>
  where
    F: FnOnce(&mut Case) -> rentwise_core::Result<()> + Send + 'static,
  {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| Ok(update_in_tx(conn, id, &id_str, mutate)))
      .await?
  }
}

// ─── Mutation path ───────────────────────────────────────────────────────────

fn is_busy(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::DatabaseBusy
        || err.code == rusqlite::ErrorCode::DatabaseLocked
  )
}

/// Read-mutate-write inside one immediate transaction.
///
/// The write lock is taken up front; the schema's `busy_timeout` bounds how
/// long a contended lock is retried before the attempt surfaces as
/// [`Error::Conflict`]. A mutator error rolls the transaction back untouched.
fn update_in_tx<F>(
  conn: &mut rusqlite::Connection,
  id: Uuid,
  id_str: &str,
  mutate: F,
) -> Result<Case>
where
  F: FnOnce(&mut Case) -> rentwise_core::Result<()>,
{
  let tx = conn
    .transaction_with_behavior(TransactionBehavior::Immediate)
    .map_err(|e| if is_busy(&e) { Error::Conflict(id) } else { e.into() })?;

  let mut case = read_case(&tx, id_str)?.ok_or(Error::CaseNotFound(id))?;

  let events_before = case.events.clone();
  let documents_before: BTreeSet<Uuid> = case.documents.keys().copied().collect();

  mutate(&mut case).map_err(Error::Core)?;

  // Timeline is append-only: the committed prefix must survive the mutator.
  if case.events.len() < events_before.len()
    || case.events[..events_before.len()] != events_before[..]
  {
    return Err(Error::Core(rentwise_core::Error::TimelineTruncated(id)));
  }

  case.updated_at = Utc::now();
  write_case_row(&tx, &case)?;

  for (seq, event) in case.events.iter().enumerate().skip(events_before.len()) {
    insert_event(&tx, id_str, seq as i64, event)?;
  }
  for (doc_id, document) in &case.documents {
    if !documents_before.contains(doc_id) {
      insert_document(&tx, id_str, document)?;
    }
  }

  tx.commit()
    .map_err(|e| if is_busy(&e) { Error::Conflict(id) } else { e.into() })?;
  Ok(case)
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn insert_case(conn: &mut rusqlite::Connection, case: &Case) -> Result<()> {
  let tx = conn.transaction()?;
  let id_str = encode_uuid(case.case_id);

  tx.execute(
    "INSERT INTO cases (
       case_id, created_at, updated_at, status, category, subcategory,
       issue, description, renter_json, provider_json, answers_json,
       evidence_json, risk_flags_json, critical_deadline, recommendation,
       law_citations_json
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    rusqlite::params![
      id_str,
      encode_dt(case.created_at),
      encode_dt(case.updated_at),
      encode_status(case.status),
      encode_category(case.facts.category),
      case.facts.subcategory,
      case.facts.issue,
      case.facts.description,
      encode_json(&case.renter)?,
      case.provider.as_ref().map(encode_json).transpose()?,
      encode_json(&case.facts.answers)?,
      encode_json(&case.facts.evidence_urls)?,
      encode_json(&case.facts.risk_flags)?,
      case.critical_deadline.map(encode_date),
      case.recommendation,
      encode_json(&case.law_citations)?,
    ],
  )?;

  for (seq, event) in case.events.iter().enumerate() {
    insert_event(&tx, &id_str, seq as i64, event)?;
  }

  tx.commit()?;
  Ok(())
}

fn write_case_row(conn: &rusqlite::Connection, case: &Case) -> Result<()> {
  conn.execute(
    "UPDATE cases SET
       updated_at = ?2, status = ?3, category = ?4, subcategory = ?5,
       issue = ?6, description = ?7, renter_json = ?8, provider_json = ?9,
       answers_json = ?10, evidence_json = ?11, risk_flags_json = ?12,
       critical_deadline = ?13, recommendation = ?14, law_citations_json = ?15
     WHERE case_id = ?1",
    rusqlite::params![
      encode_uuid(case.case_id),
      encode_dt(case.updated_at),
      encode_status(case.status),
      encode_category(case.facts.category),
      case.facts.subcategory,
      case.facts.issue,
      case.facts.description,
      encode_json(&case.renter)?,
      case.provider.as_ref().map(encode_json).transpose()?,
      encode_json(&case.facts.answers)?,
      encode_json(&case.facts.evidence_urls)?,
      encode_json(&case.facts.risk_flags)?,
      case.critical_deadline.map(encode_date),
      case.recommendation,
      encode_json(&case.law_citations)?,
    ],
  )?;
  Ok(())
}

fn insert_event(
  conn: &rusqlite::Connection,
  case_id: &str,
  seq: i64,
  event: &TimelineEvent,
) -> Result<()> {
  conn.execute(
    "INSERT INTO case_events (case_id, seq, occurred_at, label, metadata_json)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      case_id,
      seq,
      encode_dt(event.occurred_at),
      event.label,
      encode_json(&event.metadata)?,
    ],
  )?;
  Ok(())
}

fn insert_document(
  conn: &rusqlite::Connection,
  case_id: &str,
  document: &Document,
) -> Result<()> {
  conn.execute(
    "INSERT INTO case_documents (
       document_id, case_id, doc_type, filename, created_at, content_hash,
       urls_json, metadata_json
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      encode_uuid(document.document_id),
      case_id,
      document.doc_type,
      document.filename,
      encode_dt(document.created_at),
      document.content_hash,
      encode_json(&document.urls)?,
      encode_json(&document.metadata)?,
    ],
  )?;
  Ok(())
}

// ─── Read path ───────────────────────────────────────────────────────────────

fn read_case(conn: &rusqlite::Connection, id_str: &str) -> Result<Option<Case>> {
  let raw: Option<RawCase> = conn
    .query_row(
      "SELECT case_id, created_at, updated_at, status, category, subcategory,
              issue, description, renter_json, provider_json, answers_json,
              evidence_json, risk_flags_json, critical_deadline,
              recommendation, law_citations_json
       FROM cases WHERE case_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawCase {
          case_id:            row.get(0)?,
          created_at:         row.get(1)?,
          updated_at:         row.get(2)?,
          status:             row.get(3)?,
          category:           row.get(4)?,
          subcategory:        row.get(5)?,
          issue:              row.get(6)?,
          description:        row.get(7)?,
          renter_json:        row.get(8)?,
          provider_json:      row.get(9)?,
          answers_json:       row.get(10)?,
          evidence_json:      row.get(11)?,
          risk_flags_json:    row.get(12)?,
          critical_deadline:  row.get(13)?,
          recommendation:     row.get(14)?,
          law_citations_json: row.get(15)?,
        })
      },
    )
    .optional()?;

  let raw = match raw {
    Some(raw) => raw,
    None => return Ok(None),
  };

  let mut stmt = conn.prepare(
    "SELECT occurred_at, label, metadata_json
     FROM case_events WHERE case_id = ?1 ORDER BY seq",
  )?;
  let events = stmt
    .query_map(rusqlite::params![id_str], |row| {
      Ok(RawEvent {
        occurred_at:   row.get(0)?,
        label:         row.get(1)?,
        metadata_json: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT document_id, doc_type, filename, created_at, content_hash,
            urls_json, metadata_json
     FROM case_documents WHERE case_id = ?1 ORDER BY created_at, document_id",
  )?;
  let documents = stmt
    .query_map(rusqlite::params![id_str], |row| {
      Ok(RawDocument {
        document_id:   row.get(0)?,
        doc_type:      row.get(1)?,
        filename:      row.get(2)?,
        created_at:    row.get(3)?,
        content_hash:  row.get(4)?,
        urls_json:     row.get(5)?,
        metadata_json: row.get(6)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raw.into_case(events, documents).map(Some)
}

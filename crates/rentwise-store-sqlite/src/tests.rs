//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use rentwise_core::{
  case::{CaseCategory, CaseFacts, CaseStatus, Citation, NewCase, Renter},
  document::Document,
  event::TimelineEvent,
  store::CaseStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn repairs_case() -> NewCase {
  NewCase {
    renter:            Renter::named("Ada Tenant"),
    provider:          None,
    facts:             CaseFacts {
      category:      CaseCategory::RepairsUrgent,
      subcategory:   Some("hot_water_out".into()),
      issue:         "no hot water".into(),
      description:   Some("no hot water for 5 days".into()),
      answers:       BTreeMap::new(),
      evidence_urls: vec!["https://example.invalid/photo.jpg".into()],
      risk_flags:    BTreeSet::from(["urgent_repair".to_string()]),
    },
    critical_deadline: None,
    events:            vec![TimelineEvent::now("Case created")],
  }
}

fn sample_document() -> Document {
  let document_id = Uuid::new_v4();
  Document {
    document_id,
    doc_type: "repairs_urgent".into(),
    filename: format!("repairs_urgent-{document_id}.docx"),
    created_at: Utc::now(),
    content_hash: "deadbeef".into(),
    urls: BTreeMap::from([(
      "docx".to_string(),
      "https://example.invalid/documents/x.docx".to_string(),
    )]),
    metadata: BTreeMap::from([("subject".to_string(), "Urgent repairs".to_string())]),
  }
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_case() {
  let s = store().await;

  let case = s.create_case(repairs_case()).await.unwrap();
  assert_eq!(case.status, CaseStatus::Intake);
  assert_eq!(case.events.len(), 1);

  let fetched = s.get_case(case.case_id).await.unwrap().unwrap();
  assert_eq!(fetched.case_id, case.case_id);
  assert_eq!(fetched.facts.category, CaseCategory::RepairsUrgent);
  assert_eq!(fetched.facts.subcategory.as_deref(), Some("hot_water_out"));
  assert_eq!(fetched.events.len(), 1);
  assert_eq!(fetched.events[0].label, "Case created");
  assert!(fetched.facts.risk_flags.contains("urgent_repair"));
}

#[tokio::test]
async fn get_case_missing_returns_none() {
  let s = store().await;
  assert!(s.get_case(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn case_ids_are_unique_across_creates() {
  let s = store().await;
  let a = s.create_case(repairs_case()).await.unwrap();
  let b = s.create_case(repairs_case()).await.unwrap();
  assert_ne!(a.case_id, b.case_id);

  let summaries = s.list_cases().await.unwrap();
  assert_eq!(summaries.len(), 2);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_appends_events_and_advances_status() {
  let s = store().await;
  let case = s.create_case(repairs_case()).await.unwrap();

  let updated = s
    .update_case(case.case_id, |case| {
      case.advance_status(CaseStatus::Reasoned);
      case.record_event(TimelineEvent::now("Reasoning generated"));
      Ok(())
    })
    .await
    .unwrap();

  assert_eq!(updated.status, CaseStatus::Reasoned);
  assert_eq!(updated.events.len(), 2);

  let fetched = s.get_case(case.case_id).await.unwrap().unwrap();
  assert_eq!(fetched.events.len(), 2);
  assert_eq!(fetched.events[1].label, "Reasoning generated");
  assert!(fetched.updated_at >= case.updated_at);
}

#[tokio::test]
async fn update_unknown_case_errors() {
  let s = store().await;
  let err = s
    .update_case(Uuid::new_v4(), |_case| Ok(()))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::CaseNotFound(_)));
}

#[tokio::test]
async fn failed_mutator_leaves_case_untouched() {
  let s = store().await;
  let case = s.create_case(repairs_case()).await.unwrap();

  let err = s
    .update_case(case.case_id, |case| {
      case.record_event(TimelineEvent::now("should not persist"));
      Err(rentwise_core::Error::DocumentNotFound(Uuid::new_v4()))
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(_)));

  let fetched = s.get_case(case.case_id).await.unwrap().unwrap();
  assert_eq!(fetched.events.len(), 1);
}

#[tokio::test]
async fn timeline_truncation_is_rejected() {
  let s = store().await;
  let case = s.create_case(repairs_case()).await.unwrap();

  let err = s
    .update_case(case.case_id, |case| {
      case.events.clear();
      Ok(())
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(rentwise_core::Error::TimelineTruncated(_))
  ));

  let err = s
    .update_case(case.case_id, |case| {
      case.events[0].label = "rewritten".into();
      Ok(())
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(rentwise_core::Error::TimelineTruncated(_))
  ));

  let fetched = s.get_case(case.case_id).await.unwrap().unwrap();
  assert_eq!(fetched.events.len(), 1);
  assert_eq!(fetched.events[0].label, "Case created");
}

#[tokio::test]
async fn documents_accumulate_and_are_never_overwritten() {
  let s = store().await;
  let case = s.create_case(repairs_case()).await.unwrap();

  let first = sample_document();
  let first_id = first.document_id;
  s.update_case(case.case_id, move |case| {
    case.documents.insert(first.document_id, first);
    Ok(())
  })
  .await
  .unwrap();

  let second = sample_document();
  let second_id = second.document_id;
  s.update_case(case.case_id, move |case| {
    case.documents.insert(second.document_id, second);
    Ok(())
  })
  .await
  .unwrap();

  let fetched = s.get_case(case.case_id).await.unwrap().unwrap();
  assert_eq!(fetched.documents.len(), 2);
  assert!(fetched.documents.contains_key(&first_id));
  assert!(fetched.documents.contains_key(&second_id));
}

#[tokio::test]
async fn citations_are_replaced_not_merged() {
  let s = store().await;
  let case = s.create_case(repairs_case()).await.unwrap();

  let first = vec![
    Citation {
      point: "old point a".into(),
      url:   "https://example.invalid/a".into(),
      as_of: chrono::NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
    },
    Citation {
      point: "old point b".into(),
      url:   "https://example.invalid/b".into(),
      as_of: chrono::NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
    },
  ];
  s.update_case(case.case_id, move |case| {
    case.law_citations = first;
    Ok(())
  })
  .await
  .unwrap();

  let replacement = vec![Citation {
    point: "new point".into(),
    url:   "https://example.invalid/c".into(),
    as_of: chrono::NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
  }];
  s.update_case(case.case_id, move |case| {
    case.law_citations = replacement;
    Ok(())
  })
  .await
  .unwrap();

  let fetched = s.get_case(case.case_id).await.unwrap().unwrap();
  assert_eq!(fetched.law_citations.len(), 1);
  assert_eq!(fetched.law_citations[0].url, "https://example.invalid/c");
}

#[tokio::test]
async fn status_never_regresses_through_updates() {
  let s = store().await;
  let case = s.create_case(repairs_case()).await.unwrap();

  s.update_case(case.case_id, |case| {
    case.advance_status(CaseStatus::Drafted);
    Ok(())
  })
  .await
  .unwrap();

  let updated = s
    .update_case(case.case_id, |case| {
      case.advance_status(CaseStatus::Reasoned);
      Ok(())
    })
    .await
    .unwrap();
  assert_eq!(updated.status, CaseStatus::Drafted);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_updates_serialize_event_appends() {
  let s = store().await;
  let case = s.create_case(repairs_case()).await.unwrap();

  let mut handles = Vec::new();
  for i in 0..8 {
    let store = s.clone();
    let case_id = case.case_id;
    handles.push(tokio::spawn(async move {
      store
        .update_case(case_id, move |case| {
          case.record_event(TimelineEvent::now(format!("update {i}")));
          Ok(())
        })
        .await
    }));
  }
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let fetched = s.get_case(case.case_id).await.unwrap().unwrap();
  // Seed event plus one per concurrent update, each with a distinct slot.
  assert_eq!(fetched.events.len(), 9);
}

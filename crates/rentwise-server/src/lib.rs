//! HTTP server assembly for Rentwise.
//!
//! Owns the runtime configuration, builds the shared [`ApiState`], and nests
//! the JSON API under `/api` next to the health probe.

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use rentwise_agents::{GenerationConfig, Generator, drafter::DrafterConfig};
use rentwise_api::ApiState;
use rentwise_core::store::CaseStore;
use rentwise_law::{LawIndex, builtin_corpus};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_base_url() -> String { "http://127.0.0.1:8080".to_string() }
fn default_store_path() -> PathBuf { PathBuf::from("rentwise.db") }

/// Runtime server configuration, deserialised from `config.toml` plus
/// `RENTWISE_*` environment overrides. Every key has a default, so an empty
/// config boots an offline server with an on-disk store.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// Public URL prefix used when publishing document links.
  #[serde(default = "default_base_url")]
  pub base_url:   String,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub generation: GenerationConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      base_url:   default_base_url(),
      store_path: default_store_path(),
      generation: GenerationConfig::default(),
    }
  }
}

impl ServerConfig {
  fn document_base_url(&self) -> String {
    format!("{}/documents", self.base_url.trim_end_matches('/'))
  }
}

// ─── State assembly ───────────────────────────────────────────────────────────

/// Build the shared API state: store handle, law index, generation client,
/// drafter config.
pub fn app_state<S>(store: S, config: &ServerConfig) -> anyhow::Result<ApiState<S>>
where
  S: CaseStore + 'static,
{
  let generator = Generator::new(config.generation.clone())?;
  Ok(ApiState {
    store:     Arc::new(store),
    law:       Arc::new(LawIndex::new(builtin_corpus())),
    generator: Arc::new(generator),
    drafter:   DrafterConfig { document_base_url: config.document_base_url() },
  })
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Simple readiness probe used by deployment tooling.
async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

/// Build the full application router.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: CaseStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", rentwise_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rentwise_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn test_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = app_state(store, &ServerConfig::default()).unwrap();
    router(state)
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        builder.body(Body::from(json.to_string())).unwrap()
      }
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn intake_payload() -> Value {
    json!({
      "renter": { "full_name": "Ada Tenant" },
      "issue": "repairs",
      "free_text": "no hot water for 5 days",
      "answers": { "subcategory": "hot_water_out" },
      "evidence_urls": ["https://example.invalid/photo.jpg"]
    })
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn healthcheck_returns_ok() {
    let app = test_router().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }

  // ── End-to-end pipeline ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn intake_reason_draft_escalate_flow() {
    let app = test_router().await;

    // Intake: hot-water issue classifies as urgent repairs with a risk flag.
    let (status, intake) =
      send(&app, "POST", "/api/intake", Some(intake_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(intake["category"], "repairs_urgent");
    assert_eq!(intake["status"], "intake");
    assert!(
      intake["risk_flags"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "urgent_repair")
    );
    let case_id = intake["case_id"].as_str().unwrap().to_string();

    // Reason: at least one citation with a point and url, deadlines after
    // the intake date.
    let (status, reasoning) =
      send(&app, "POST", &format!("/api/cases/{case_id}/reason"), None).await;
    assert_eq!(status, StatusCode::OK);
    let citations = reasoning["law_citations"].as_array().unwrap();
    assert!(!citations.is_empty());
    assert!(!citations[0]["point"].as_str().unwrap().is_empty());
    assert!(citations[0]["url"].as_str().unwrap().starts_with("https://"));
    let deadlines = reasoning["deadlines"].as_array().unwrap();
    assert!(!deadlines.is_empty());
    let today = chrono::Utc::now().date_naive();
    for deadline in deadlines {
      let due: chrono::NaiveDate =
        deadline["due_date"].as_str().unwrap().parse().unwrap();
      assert!(due > today);
    }

    // Draft: docx document with a retrievable URL.
    let (status, draft) = send(
      &app,
      "POST",
      &format!("/api/cases/{case_id}/draft"),
      Some(json!({ "template": "repairs_urgent", "channel": "docx" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!draft["urls"]["docx"].as_str().unwrap().is_empty());
    assert!(!draft["preview_body"].as_str().unwrap().is_empty());
    let doc_id = draft["document_id"].as_str().unwrap().to_string();

    // Full case view: drafted, 3+ events, one document, citations present.
    let (status, case) =
      send(&app, "GET", &format!("/api/cases/{case_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "drafted");
    assert!(case["events"].as_array().unwrap().len() >= 3);
    assert_eq!(case["documents"].as_object().unwrap().len(), 1);
    assert!(!case["law_citations"].as_array().unwrap().is_empty());

    // Stored document is downloadable.
    let (status, document) = send(
      &app,
      "GET",
      &format!("/api/cases/{case_id}/documents/{doc_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!document["body"].as_str().unwrap().is_empty());

    // Escalate to RDRV and confirm the timeline recorded it.
    let (status, plan) = send(
      &app,
      "POST",
      &format!("/api/cases/{case_id}/escalate"),
      Some(json!({ "target": "rdrv" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(plan["forms_list"][0].as_str().unwrap().contains("RDRV"));

    let (_, case) =
      send(&app, "GET", &format!("/api/cases/{case_id}"), None).await;
    assert_eq!(case["status"], "escalated");
    assert!(
      case["events"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["label"] == "Escalation guidance")
    );
  }

  // ── Law search ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn law_search_is_deterministic() {
    let app = test_router().await;

    let (status, first) =
      send(&app, "GET", "/api/law/search?query=urgent%20repairs&top_k=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) =
      send(&app, "GET", "/api/law/search?query=urgent%20repairs&top_k=2", None)
        .await;

    assert_eq!(first, second);
    let results = first["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(
      results
        .iter()
        .any(|r| r["title"].as_str().unwrap().to_lowercase().contains("repairs"))
    );
  }

  #[tokio::test]
  async fn law_search_rejects_zero_top_k() {
    let app = test_router().await;
    let (status, body) =
      send(&app, "GET", "/api/law/search?query=repairs&top_k=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
  }

  // ── Error envelope ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_case_returns_not_found_kind() {
    let app = test_router().await;
    let missing = uuid::Uuid::new_v4();
    let (status, body) =
      send(&app, "POST", &format!("/api/cases/{missing}/reason"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
  }

  #[tokio::test]
  async fn unknown_escalation_target_is_rejected_and_case_untouched() {
    let app = test_router().await;

    let (_, intake) =
      send(&app, "POST", "/api/intake", Some(intake_payload())).await;
    let case_id = intake["case_id"].as_str().unwrap().to_string();

    let (_, before) =
      send(&app, "GET", &format!("/api/cases/{case_id}"), None).await;

    let (status, body) = send(
      &app,
      "POST",
      &format!("/api/cases/{case_id}/escalate"),
      Some(json!({ "target": "small_claims" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    let (_, after) =
      send(&app, "GET", &format!("/api/cases/{case_id}"), None).await;
    assert_eq!(after["status"], before["status"]);
    assert_eq!(
      after["events"].as_array().unwrap().len(),
      before["events"].as_array().unwrap().len()
    );
    assert!(after["documents"].as_object().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_document_returns_not_found() {
    let app = test_router().await;

    let (_, intake) =
      send(&app, "POST", "/api/intake", Some(intake_payload())).await;
    let case_id = intake["case_id"].as_str().unwrap().to_string();
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(
      &app,
      "GET",
      &format!("/api/cases/{case_id}/documents/{missing}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
  }
}

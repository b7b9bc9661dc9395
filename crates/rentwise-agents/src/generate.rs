//! Text-generation client: an OpenAI-compatible chat-completions endpoint
//! with a deterministic offline mode.
//!
//! Offline is the default. In that mode [`Generator::complete`] performs no
//! I/O and returns `Ok(None)`; callers fall back to their locally composed
//! text, which keeps the whole pipeline deterministic for tests. HTTP mode is
//! a bounded call: one request, one configured timeout, no retries. A failed
//! call is absorbed by the caller's fallback, never by partial case state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
  Offline,
  Http,
}

/// Runtime configuration for the generation client. Unset keys fall back to
/// the offline defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
  pub mode:         GenerationMode,
  pub base_url:     String,
  pub model:        String,
  pub api_key:      String,
  pub timeout_secs: u64,
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self {
      mode:         GenerationMode::Offline,
      base_url:     "http://127.0.0.1:1234/v1".to_string(),
      model:        "gpt-4o-mini".to_string(),
      api_key:      String::new(),
      timeout_secs: 30,
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("generation endpoint returned {status}: {body}")]
  Api { status: u16, body: String },

  #[error("api_key must be set for http generation mode")]
  MissingApiKey,

  #[error("response contained no completion choices")]
  EmptyResponse,
}

// ─── Prompt kinds ────────────────────────────────────────────────────────────

/// Which agent is asking; selects the sampling temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
  Reasoner,
  Drafter,
}

impl PromptKind {
  fn temperature(&self) -> f32 {
    match self {
      Self::Reasoner => 0.2,
      Self::Drafter => 0.0,
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    [ChatMessage<'a>; 2],
  temperature: f32,
  max_tokens:  u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

enum Inner {
  Offline,
  Http {
    client:   reqwest::Client,
    base_url: String,
    model:    String,
    api_key:  String,
  },
}

/// Thin wrapper around an OpenAI-compatible chat-completion endpoint.
pub struct Generator {
  inner: Inner,
}

impl Generator {
  pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
    let inner = match config.mode {
      GenerationMode::Offline => Inner::Offline,
      GenerationMode::Http => {
        if config.api_key.is_empty() {
          return Err(GenerationError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()?;
        Inner::Http {
          client,
          base_url: config.base_url.trim_end_matches('/').to_string(),
          model: config.model,
          api_key: config.api_key,
        }
      }
    };
    Ok(Self { inner })
  }

  /// A generator that always reports offline.
  pub fn offline() -> Self {
    Self { inner: Inner::Offline }
  }

  /// Run one chat completion. Returns `Ok(None)` in offline mode.
  pub async fn complete(
    &self,
    kind: PromptKind,
    system: &str,
    user: &str,
  ) -> Result<Option<String>, GenerationError> {
    let (client, base_url, model, api_key) = match &self.inner {
      Inner::Offline => return Ok(None),
      Inner::Http { client, base_url, model, api_key } => {
        (client, base_url, model, api_key)
      }
    };

    let request = ChatRequest {
      model,
      messages: [
        ChatMessage { role: "system", content: system },
        ChatMessage { role: "user", content: user },
      ],
      temperature: kind.temperature(),
      max_tokens: 800,
    };

    let response = client
      .post(format!("{base_url}/chat/completions"))
      .bearer_auth(api_key)
      .json(&request)
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(GenerationError::Api {
        status: response.status().as_u16(),
        body:   response.text().await.unwrap_or_default(),
      });
    }

    let parsed: ChatResponse = response.json().await?;
    let content = parsed
      .choices
      .into_iter()
      .next()
      .map(|c| c.message.content)
      .ok_or(GenerationError::EmptyResponse)?;
    Ok(Some(content))
  }
}

/// Prefer a generated rewrite of `composed`, falling back to `composed`
/// itself when the generator is offline, errors, or returns nothing useful.
pub(crate) async fn refine(
  generator: &Generator,
  kind: PromptKind,
  system: &str,
  user: &str,
  composed: String,
) -> String {
  match generator.complete(kind, system, user).await {
    Ok(Some(text)) if !text.trim().is_empty() => text,
    Ok(_) => composed,
    Err(e) => {
      tracing::warn!("generation unavailable, keeping local composition: {e}");
      composed
    }
  }
}

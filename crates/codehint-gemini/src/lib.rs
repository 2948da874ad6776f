//! Async client for the Gemini `generateContent` REST endpoint.
//!
//! [`GeminiClient`] implements [`codehint_core::model::TextModel`]: one
//! prompt in, the first candidate's text out.

mod wire;

use std::time::Duration;

use codehint_core::model::TextModel;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use wire::{ErrorEnvelope, GenerateRequest, GenerateResponse};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Model settings, deserialised from the `[model]` config table.
#[derive(Deserialize, Clone)]
pub struct GeminiConfig {
  pub api_key:      String,
  #[serde(default = "default_name")]
  pub name:         String,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Whole-request timeout. `None` leaves the call unbounded.
  #[serde(default)]
  pub timeout_secs: Option<u64>,
}

fn default_name() -> String { "gemini-2.5-flash-lite".to_owned() }

fn default_base_url() -> String { "https://generativelanguage.googleapis.com".to_owned() }

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Http(#[from] reqwest::Error),

  /// Non-success status; `message` is the upstream error text.
  #[error("{status} {message}")]
  Api { status: u16, message: String },

  /// The model returned no text, e.g. because the prompt was blocked.
  #[error("model returned no text ({reason})")]
  Empty { reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for one Gemini model.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client: Client,
  config: GeminiConfig,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let mut builder = Client::builder().connect_timeout(Duration::from_secs(10));
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(Self { client: builder.build()?, config })
  }

  pub fn model(&self) -> &str { &self.config.name }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.name
    )
  }

  /// `POST /v1beta/models/{model}:generateContent`
  pub async fn generate_content(&self, prompt: &str) -> Result<String> {
    let resp = self
      .client
      .post(self.url())
      .header("x-goog-api-key", &self.config.api_key)
      .json(&GenerateRequest::from_prompt(prompt))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Api { status: status.as_u16(), message: error_message(&body) });
    }

    let body: GenerateResponse = resp.json().await?;
    tracing::debug!(model = %self.config.name, "generateContent succeeded");
    body.into_text()
  }
}

impl TextModel for GeminiClient {
  type Error = Error;

  async fn generate(&self, prompt: &str) -> Result<String> { self.generate_content(prompt).await }
}

/// Pull `error.status` / `error.message` out of an error body, falling back
/// to the raw body when it is not the documented envelope.
fn error_message(body: &str) -> String {
  match serde_json::from_str::<ErrorEnvelope>(body) {
    Ok(env) => match env.error.status {
      Some(status) => format!("{status}. {}", env.error.message),
      None => env.error.message,
    },
    Err(_) => body.to_owned(),
  }
}

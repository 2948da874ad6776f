//! Request and response bodies for `generateContent`.
//!
//! Only the fields this client reads are modelled; everything else in the
//! upstream payload is ignored.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
  pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
  pub role:  &'static str,
  pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Part<'a> {
  pub text: &'a str,
}

impl<'a> GenerateRequest<'a> {
  pub fn from_prompt(prompt: &'a str) -> Self {
    Self {
      contents: vec![Content { role: "user", parts: vec![Part { text: prompt }] }],
    }
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
  #[serde(default)]
  pub candidates:      Vec<Candidate>,
  pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
  pub content:       Option<CandidateContent>,
  pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
  #[serde(default)]
  pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
  pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
  pub block_reason: Option<String>,
}

impl GenerateResponse {
  /// Concatenate the text parts of the first candidate.
  pub fn into_text(self) -> Result<String> {
    let Some(candidate) = self.candidates.into_iter().next() else {
      let reason = self
        .prompt_feedback
        .and_then(|f| f.block_reason)
        .unwrap_or_else(|| "no candidates".to_owned());
      return Err(Error::Empty { reason });
    };

    let text: String = candidate
      .content
      .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
      .unwrap_or_default();

    if text.is_empty() {
      let reason = candidate.finish_reason.unwrap_or_else(|| "empty content".to_owned());
      return Err(Error::Empty { reason });
    }
    Ok(text)
  }
}

// ─── Error envelope ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
  pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
  pub message: String,
  pub status:  Option<String>,
}

//! `POST /api/ask`, body: `{"question":"...","mode":"hint","email":"..."}`.
//!
//! Records the submission on the extension ledger (known users only), then
//! forwards the mode-specific prompt to the model and returns its text.

use axum::{Json, extract::State};
use codehint_core::{
  error::require,
  ledger::{Channel, record_submission},
  mail::Mailer,
  model::TextModel,
  prompt::Mode,
  store::AccountStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::{ApiError, JsonBody},
};

#[derive(Debug, Deserialize)]
pub struct AskBody {
  pub question: Option<String>,
  /// `solution` | `explain` | `hint`; anything else sends the question as-is.
  pub mode:     Option<String>,
  pub email:    Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
  pub result: String,
}

pub async fn handler<S, M, G>(
  State(state): State<AppState<S, M, G>>,
  JsonBody(body): JsonBody<AskBody>,
) -> Result<Json<AskResponse>, ApiError>
where
  S: AccountStore,
  M: Mailer,
  G: TextModel,
{
  let question = require("question", body.question)?;

  // Recorded before the model call so a failed call still counts.
  let recorded = record_submission(
    state.store.as_ref(),
    body.email.as_deref(),
    &question,
    Channel::Extension,
  )
  .await
  .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mode = Mode::parse(body.mode.as_deref());
  let prompt = mode.compose(&question);

  let result = state.model.generate(&prompt).await.map_err(|e| {
    tracing::warn!(?mode, error = %e, "model call failed");
    ApiError::Upstream(e.to_string())
  })?;

  tracing::info!(?mode, recorded = recorded.is_some(), "answered question");
  Ok(Json(AskResponse { result }))
}

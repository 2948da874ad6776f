//! Handlers for the one-time-code endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/send-otp` | Body: `{"email":"..."}`; mails a code, echoes it unless disabled |
//! | `POST` | `/api/verify-otp` | Body: `{"email":"...","otp":"123456"}`; consumes the challenge |

use axum::{Json, extract::State};
use chrono::Utc;
use codehint_core::{
  error::require,
  mail::Mailer,
  model::TextModel,
  otp::{Otp, OtpChallenge},
  store::AccountStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::{ApiError, JsonBody},
};

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendBody {
  pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
  pub message: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub otp:     Option<Otp>,
}

/// `POST /api/send-otp`
pub async fn send<S, M, G>(
  State(state): State<AppState<S, M, G>>,
  JsonBody(body): JsonBody<SendBody>,
) -> Result<Json<SendResponse>, ApiError>
where
  S: AccountStore,
  M: Mailer,
  G: TextModel,
{
  let email = require("email", body.email)?;

  let otp = Otp::generate();
  let challenge = OtpChallenge::issue(&email, otp, state.otp.ttl_secs, Utc::now())?;
  state
    .store
    .put_otp_challenge(challenge)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  state
    .mailer
    .send(&otp.mail(&email))
    .await
    .map_err(|e| ApiError::Mail(Box::new(e)))?;

  tracing::info!(expose_code = state.otp.expose_code, "OTP sent");
  Ok(Json(SendResponse {
    message: "OTP sent successfully",
    otp:     state.otp.expose_code.then_some(otp),
  }))
}

// ─── Verify ───────────────────────────────────────────────────────────────────

/// Clients send the code either as a JSON string or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CodeField {
  Text(String),
  Number(u64),
}

impl CodeField {
  fn into_string(self) -> String {
    match self {
      CodeField::Text(s) => s,
      CodeField::Number(n) => n.to_string(),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub email: Option<String>,
  pub otp:   Option<CodeField>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
  pub message: &'static str,
}

/// `POST /api/verify-otp`
///
/// The stored challenge is removed whether or not the code matches, so each
/// code can be tried once.
pub async fn verify<S, M, G>(
  State(state): State<AppState<S, M, G>>,
  JsonBody(body): JsonBody<VerifyBody>,
) -> Result<Json<VerifyResponse>, ApiError>
where
  S: AccountStore,
  M: Mailer,
  G: TextModel,
{
  let email = require("email", body.email)?;
  let code = require("OTP", body.otp.map(CodeField::into_string))?;

  let challenge = state
    .store
    .take_otp_challenge(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(codehint_core::Error::InvalidOtp)?;
  challenge.check(&code, Utc::now())?;

  let (user, created) = state
    .store
    .get_or_create_user(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(user_id = user.id, created, "OTP verified");
  Ok(Json(VerifyResponse { message: "OTP verified successfully" }))
}

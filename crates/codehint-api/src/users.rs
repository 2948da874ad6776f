//! `POST /api/verify-user`, body: `{"email":"..."}`.
//!
//! Creates the user on first sight. No credential is checked; presence of
//! the email is sufficient.

use axum::{Json, extract::State};
use codehint_core::{
  error::require,
  mail::Mailer,
  model::TextModel,
  store::AccountStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::{ApiError, JsonBody},
};

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
  pub message: &'static str,
}

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

  let (user, created) = state
    .store
    .get_or_create_user(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(user_id = user.id, created, "user verified");
  Ok(Json(VerifyResponse { message: "User verified and created successfully" }))
}

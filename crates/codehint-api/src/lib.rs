//! JSON HTTP API for codehint.
//!
//! Exposes an axum [`Router`] backed by any [`AccountStore`], [`Mailer`] and
//! [`TextModel`]. CORS, tracing and transport concerns are the caller's
//! responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/send-otp` | Body: `{"email"}` |
//! | `POST` | `/api/verify-otp` | Body: `{"email","otp"}` |
//! | `POST` | `/api/verify-user` | Body: `{"email"}` |
//! | `POST` | `/api/ask` | Body: `{"question","mode"?,"email"?}` |
//! | `GET`  | `/health` | Liveness |

pub mod ask;
pub mod error;
pub mod health;
pub mod otp;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use codehint_core::{mail::Mailer, model::TextModel, store::AccountStore};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// How `/api/send-otp` treats the generated code, from the `[otp]` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OtpPolicy {
  /// Echo the code in the response body. Existing extension clients compare
  /// against it locally.
  #[serde(default = "default_expose_code")]
  pub expose_code: bool,
  /// Lifetime of the server-side challenge checked by `/api/verify-otp`.
  #[serde(default = "default_ttl_secs")]
  pub ttl_secs:    u64,
}

fn default_expose_code() -> bool { true }

fn default_ttl_secs() -> u64 { 600 }

impl Default for OtpPolicy {
  fn default() -> Self {
    Self { expose_code: default_expose_code(), ttl_secs: default_ttl_secs() }
  }
}

impl OtpPolicy {
  /// Reject a `ttl_secs` whose expiry cannot be represented.
  pub fn validate(&self) -> Result<(), codehint_core::Error> {
    codehint_core::otp::expiry(self.ttl_secs, chrono::Utc::now()).map(|_| ())
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Service objects shared by all handlers. Built once at startup.
pub struct AppState<S, M, G> {
  pub store:  Arc<S>,
  pub mailer: Arc<M>,
  pub model:  Arc<G>,
  pub otp:    OtpPolicy,
}

// Not derived: `S`, `M` and `G` need not be `Clone`.
impl<S, M, G> Clone for AppState<S, M, G> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      mailer: Arc::clone(&self.mailer),
      model:  Arc::clone(&self.model),
      otp:    self.otp,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S, M, G>(state: AppState<S, M, G>) -> Router<()>
where
  S: AccountStore + 'static,
  M: Mailer + 'static,
  G: TextModel + 'static,
{
  Router::new()
    .route("/api/send-otp", post(otp::send::<S, M, G>))
    .route("/api/verify-otp", post(otp::verify::<S, M, G>))
    .route("/api/verify-user", post(users::verify::<S, M, G>))
    .route("/api/ask", post(ask::handler::<S, M, G>))
    .route("/health", get(health::handler))
    .with_state(state)
}

#[cfg(test)]
mod tests;

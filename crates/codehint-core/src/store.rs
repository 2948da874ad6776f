//! The `AccountStore` trait.
//!
//! Implemented by storage backends (e.g. `codehint-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  ledger::{Channel, NewSolvedQuestion, SolvedQuestion},
  otp::OtpChallenge,
  user::{User, UserId},
};

/// Persistence for users, the solved-question ledgers, and OTP challenges.
///
/// Users and ledger rows are never updated or deleted. All methods return
/// `Send` futures so the trait can be used behind axum handlers.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Look up a user by exact email match.
  fn find_user<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Return the user for `email`, creating it if absent. The flag is `true`
  /// when a new row was inserted.
  fn get_or_create_user<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<(User, bool), Self::Error>> + Send + 'a;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// Append a row to the ledger named by `input.channel`. `solved_at` is
  /// set by the store.
  fn record_solved(
    &self,
    input: NewSolvedQuestion,
  ) -> impl Future<Output = Result<SolvedQuestion, Self::Error>> + Send + '_;

  /// All rows a user has on one channel, oldest first.
  fn list_solved(
    &self,
    user_id: UserId,
    channel: Channel,
  ) -> impl Future<Output = Result<Vec<SolvedQuestion>, Self::Error>> + Send + '_;

  // ── OTP challenges ────────────────────────────────────────────────────

  /// Store `challenge`, replacing any outstanding one for the same email.
  fn put_otp_challenge(
    &self,
    challenge: OtpChallenge,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove and return the outstanding challenge for `email`, if any.
  fn take_otp_challenge<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<OtpChallenge>, Self::Error>> + Send + 'a;
}

//! Error types for `codehint-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  /// A required request field was absent or empty.
  #[error("no {0} provided")]
  MissingField(&'static str),

  /// The presented code does not match an outstanding, unexpired challenge.
  #[error("invalid or expired OTP")]
  InvalidOtp,

  /// A configured code lifetime pushes the expiry past the representable
  /// range of timestamps.
  #[error("OTP lifetime of {0}s is out of range")]
  TtlOutOfRange(u64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unwrap a required request field. `None` and the empty string are both
/// treated as missing; whitespace is not trimmed.
pub fn require(field: &'static str, value: Option<String>) -> Result<String> {
  match value {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(Error::MissingField(field)),
  }
}

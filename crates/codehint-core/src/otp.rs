//! One-time codes: generation, the notification mail, and the hashed
//! server-side challenge used by `/api/verify-otp`.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{Error, Result, mail::OutgoingMail};

pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

pub const OTP_SUBJECT: &str = "Your OTP Code";

/// A six-digit numeric code in `[OTP_MIN, OTP_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Otp(u32);

impl Otp {
  /// Draw a code from the thread-local RNG.
  pub fn generate() -> Self { Self::generate_with(&mut rand::rng()) }

  pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
    Self(rng.random_range(OTP_MIN..=OTP_MAX))
  }

  pub fn value(self) -> u32 { self.0 }

  /// Hex-encoded SHA-256 of the decimal code.
  pub fn digest(self) -> String { hash_code(&self.0.to_string()) }

  /// The notification mail carrying this code to `recipient`.
  pub fn mail(self, recipient: &str) -> OutgoingMail {
    OutgoingMail {
      subject:    OTP_SUBJECT.to_owned(),
      recipients: vec![recipient.to_owned()],
      text_body:  format!("Your OTP code is {self}"),
      html_body:  format!("<p>Your OTP code is <strong>{self}</strong></p>"),
    }
  }
}

impl fmt::Display for Otp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Hex-encoded SHA-256 of a code as presented by a client.
pub fn hash_code(code: &str) -> String {
  hex::encode(Sha256::digest(code.trim().as_bytes()))
}

/// `now + ttl_secs`, or [`Error::TtlOutOfRange`] when that instant is not
/// representable.
pub fn expiry(ttl_secs: u64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
  i64::try_from(ttl_secs)
    .ok()
    .and_then(Duration::try_seconds)
    .and_then(|ttl| now.checked_add_signed(ttl))
    .ok_or(Error::TtlOutOfRange(ttl_secs))
}

/// An outstanding code for one email address. Only the hash is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
  pub email:      String,
  pub code_hash:  String,
  pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
  pub fn issue(email: &str, otp: Otp, ttl_secs: u64, now: DateTime<Utc>) -> Result<Self> {
    Ok(Self {
      email:      email.to_owned(),
      code_hash:  otp.digest(),
      expires_at: expiry(ttl_secs, now)?,
    })
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now > self.expires_at }

  /// Accept `code` if it hashes to the stored value and the challenge has
  /// not expired at `now`.
  pub fn check(&self, code: &str, now: DateTime<Utc>) -> Result<()> {
    if self.is_expired(now) || hash_code(code) != self.code_hash {
      return Err(Error::InvalidOtp);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  #[test]
  fn generated_codes_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..10_000 {
      let otp = Otp::generate_with(&mut rng).value();
      assert!((OTP_MIN..=OTP_MAX).contains(&otp), "{otp} out of range");
    }
  }

  #[test]
  fn mail_carries_code_in_both_bodies() {
    let mail = Otp(123_456).mail("user@example.com");
    assert_eq!(mail.subject, "Your OTP Code");
    assert_eq!(mail.recipients, vec!["user@example.com".to_string()]);
    assert_eq!(mail.text_body, "Your OTP code is 123456");
    assert_eq!(mail.html_body, "<p>Your OTP code is <strong>123456</strong></p>");
  }

  #[test]
  fn digest_matches_hash_of_decimal_code() {
    assert_eq!(Otp(654_321).digest(), hash_code("654321"));
    assert_eq!(Otp(654_321).digest().len(), 64);
  }

  #[test]
  fn challenge_accepts_matching_code_before_expiry() {
    let now = Utc::now();
    let challenge = OtpChallenge::issue("a@b.c", Otp(111_222), 600, now).unwrap();
    assert_ne!(challenge.code_hash, "111222");
    assert!(challenge.check("111222", now).is_ok());
    assert!(challenge.check(" 111222 ", now + Duration::minutes(9)).is_ok());
  }

  #[test]
  fn challenge_rejects_wrong_code() {
    let now = Utc::now();
    let challenge = OtpChallenge::issue("a@b.c", Otp(111_222), 600, now).unwrap();
    assert_eq!(challenge.check("111223", now), Err(Error::InvalidOtp));
  }

  #[test]
  fn challenge_rejects_after_expiry() {
    let now = Utc::now();
    let challenge = OtpChallenge::issue("a@b.c", Otp(111_222), 600, now).unwrap();
    assert_eq!(
      challenge.check("111222", now + Duration::minutes(11)),
      Err(Error::InvalidOtp)
    );
  }

  #[test]
  fn unrepresentable_ttl_is_an_error() {
    let now = Utc::now();
    assert_eq!(expiry(u64::MAX, now), Err(Error::TtlOutOfRange(u64::MAX)));
    assert_eq!(
      OtpChallenge::issue("a@b.c", Otp(111_222), 1_000_000_000_000_000, now),
      Err(Error::TtlOutOfRange(1_000_000_000_000_000))
    );
    assert_eq!(expiry(0, now), Ok(now));
  }
}

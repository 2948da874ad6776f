//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use codehint_core::{
  ledger::{Channel, SolvedQuestion},
  otp::OtpChallenge,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Channel ─────────────────────────────────────────────────────────────────

/// Ledger table backing each channel. Only these literals are ever spliced
/// into SQL.
pub fn ledger_table(c: Channel) -> &'static str {
  match c {
    Channel::WithoutExtension => "without_extension_solved_questions",
    Channel::Extension => "extension_solved_questions",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a ledger row.
pub struct RawSolvedQuestion {
  pub id:             i64,
  pub user_id:        i64,
  pub question_title: String,
  pub solved_at:      String,
}

impl RawSolvedQuestion {
  pub fn into_solved(self, channel: Channel) -> Result<SolvedQuestion> {
    Ok(SolvedQuestion {
      id: self.id,
      user_id: self.user_id,
      channel,
      question_title: self.question_title,
      solved_at: decode_dt(&self.solved_at)?,
    })
  }
}

/// Raw strings read directly from an `otp_challenges` row.
pub struct RawOtpChallenge {
  pub email:      String,
  pub code_hash:  String,
  pub expires_at: String,
}

impl RawOtpChallenge {
  pub fn into_challenge(self) -> Result<OtpChallenge> {
    Ok(OtpChallenge {
      email:      self.email,
      code_hash:  self.code_hash,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}

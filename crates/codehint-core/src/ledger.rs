//! Solved-question ledger: append-only, one log per submission channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  store::AccountStore,
  user::UserId,
};

/// Number of leading characters dropped from a submitted question before it
/// is stored as a title. Callers prepend a fixed-length instruction block.
pub const QUESTION_PREFIX_LEN: usize = 157;

/// Where a submission originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
  /// Submitted from the web app.
  WithoutExtension,
  /// Submitted from the browser extension.
  Extension,
}

/// A persisted ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedQuestion {
  pub id:             i64,
  pub user_id:        UserId,
  pub channel:        Channel,
  pub question_title: String,
  /// Set by the store at insertion.
  pub solved_at:      DateTime<Utc>,
}

/// Input for [`AccountStore::record_solved`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSolvedQuestion {
  pub user_id:        UserId,
  pub channel:        Channel,
  pub question_title: String,
}

impl NewSolvedQuestion {
  /// Build a ledger entry from a raw submitted question, applying
  /// [`question_title`].
  pub fn from_submission(user_id: UserId, channel: Channel, question: &str) -> Self {
    Self { user_id, channel, question_title: question_title(question) }
  }
}

/// Drop the first [`QUESTION_PREFIX_LEN`] characters of `question`.
///
/// Counts Unicode scalar values, not bytes. Inputs no longer than the prefix
/// yield an empty title.
pub fn question_title(question: &str) -> String {
  question.chars().skip(QUESTION_PREFIX_LEN).collect()
}

/// Append `question` to `channel`'s ledger for the user owning `email`.
///
/// A missing, empty or unknown email is a silent no-op and returns
/// `Ok(None)`.
pub async fn record_submission<S: AccountStore>(
  store:    &S,
  email:    Option<&str>,
  question: &str,
  channel:  Channel,
) -> Result<Option<SolvedQuestion>, S::Error> {
  let Some(email) = email.filter(|e| !e.is_empty()) else {
    return Ok(None);
  };

  let Some(user) = store.find_user(email).await? else {
    return Ok(None);
  };

  let entry = NewSolvedQuestion::from_submission(user.id, channel, question);
  store.record_solved(entry).await.map(Some)
}

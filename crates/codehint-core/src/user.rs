//! User: the directory entry keyed by email address.

use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// A verified user. Created once per distinct email and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:    UserId,
  pub email: String,
}

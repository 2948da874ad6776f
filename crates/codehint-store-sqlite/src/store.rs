//! [`SqliteStore`]: the SQLite implementation of [`AccountStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use codehint_core::{
  ledger::{Channel, NewSolvedQuestion, SolvedQuestion},
  otp::OtpChallenge,
  store::AccountStore,
  user::{User, UserId},
};

use crate::{
  encode::{encode_dt, ledger_table, RawOtpChallenge, RawSolvedQuestion},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An account store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised on the connection's worker thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of rows in the `users` table.
  pub async fn count_users(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
      .await?;
    Ok(n as u64)
  }

  /// Total number of rows on one ledger, across all users.
  pub async fn count_solved(&self, channel: Channel) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", ledger_table(channel));
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |r| r.get(0))?))
      .await?;
    Ok(n as u64)
  }

  /// Number of stored OTP challenges, expired or not.
  pub async fn count_otp_challenges(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM otp_challenges", [], |r| r.get(0))?))
      .await?;
    Ok(n as u64)
  }

  /// Flush the WAL and release the connection.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn find_user(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let user = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, email FROM users WHERE email = ?1",
            rusqlite::params![email],
            |row| Ok(User { id: row.get(0)?, email: row.get(1)? }),
          )
          .optional()?)
      })
      .await?;

    Ok(user)
  }

  async fn get_or_create_user(&self, email: &str) -> Result<(User, bool)> {
    let email = email.to_owned();

    let (user, created) = self
      .conn
      .call(move |conn| {
        // Lookup and insert share one transaction; the UNIQUE constraint on
        // `email` still rejects a duplicate from any other writer.
        let tx = conn.transaction()?;

        let existing: Option<UserId> = tx
          .query_row(
            "SELECT id FROM users WHERE email = ?1",
            rusqlite::params![email],
            |row| row.get(0),
          )
          .optional()?;

        let (id, created) = match existing {
          Some(id) => (id, false),
          None => {
            tx.execute("INSERT INTO users (email) VALUES (?1)", rusqlite::params![email])?;
            (tx.last_insert_rowid(), true)
          }
        };

        tx.commit()?;
        Ok((User { id, email }, created))
      })
      .await?;

    if created {
      tracing::debug!(user_id = user.id, "created user");
    }
    Ok((user, created))
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn record_solved(&self, input: NewSolvedQuestion) -> Result<SolvedQuestion> {
    let solved_at = Utc::now();
    let sql = format!(
      "INSERT INTO {} (question_title, solved_at, user_id) VALUES (?1, ?2, ?3)",
      ledger_table(input.channel)
    );

    let title  = input.question_title.clone();
    let at_str = encode_dt(solved_at);
    let user   = input.user_id;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![title, at_str, user])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(SolvedQuestion {
      id,
      user_id: input.user_id,
      channel: input.channel,
      question_title: input.question_title,
      solved_at,
    })
  }

  async fn list_solved(&self, user_id: UserId, channel: Channel) -> Result<Vec<SolvedQuestion>> {
    let sql = format!(
      "SELECT id, user_id, question_title, solved_at FROM {} WHERE user_id = ?1 ORDER BY id",
      ledger_table(channel)
    );

    let raws: Vec<RawSolvedQuestion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| {
            Ok(RawSolvedQuestion {
              id:             row.get(0)?,
              user_id:        row.get(1)?,
              question_title: row.get(2)?,
              solved_at:      row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_solved(channel)).collect()
  }

  // ── OTP challenges ────────────────────────────────────────────────────────

  async fn put_otp_challenge(&self, challenge: OtpChallenge) -> Result<()> {
    let now_str     = encode_dt(Utc::now());
    let expires_str = encode_dt(challenge.expires_at);

    let purged = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let purged = tx.execute(
          "DELETE FROM otp_challenges WHERE julianday(expires_at) < julianday(?1)",
          rusqlite::params![now_str],
        )?;

        tx.execute(
          "INSERT INTO otp_challenges (email, code_hash, expires_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (email) DO UPDATE
             SET code_hash = excluded.code_hash,
                 expires_at = excluded.expires_at",
          rusqlite::params![challenge.email, challenge.code_hash, expires_str],
        )?;

        tx.commit()?;
        Ok(purged)
      })
      .await?;

    if purged > 0 {
      tracing::debug!(purged, "purged expired OTP challenges");
    }
    Ok(())
  }

  async fn take_otp_challenge(&self, email: &str) -> Result<Option<OtpChallenge>> {
    let email = email.to_owned();

    let raw: Option<RawOtpChallenge> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw = tx
          .query_row(
            "SELECT email, code_hash, expires_at FROM otp_challenges WHERE email = ?1",
            rusqlite::params![email],
            |row| {
              Ok(RawOtpChallenge {
                email:      row.get(0)?,
                code_hash:  row.get(1)?,
                expires_at: row.get(2)?,
              })
            },
          )
          .optional()?;

        if raw.is_some() {
          tx.execute("DELETE FROM otp_challenges WHERE email = ?1", rusqlite::params![email])?;
        }

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawOtpChallenge::into_challenge).transpose()
  }
}

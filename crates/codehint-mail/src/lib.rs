//! SMTP delivery for codehint, built on [`lettre`].
//!
//! [`SmtpMailer`] implements [`codehint_core::mail::Mailer`]. Each message is
//! sent as `multipart/alternative` with a plain-text and an HTML part.

use codehint_core::mail::{Mailer, OutgoingMail};
use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Mailbox, MultiPart},
  transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use thiserror::Error;

// ─── Configuration ────────────────────────────────────────────────────────────

/// SMTP relay settings, deserialised from the `[mail]` config table.
#[derive(Deserialize, Clone)]
pub struct MailConfig {
  #[serde(default = "default_relay")]
  pub relay:    String,
  #[serde(default = "default_port")]
  pub port:     u16,
  /// Upgrade the connection with STARTTLS. Disable only for a local relay.
  #[serde(default = "default_starttls")]
  pub starttls: bool,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
  /// `From:` mailbox, e.g. `"Codehint <otp@example.com>"`.
  pub sender:   String,
}

fn default_relay() -> String { "smtp-relay.sendinblue.com".to_owned() }

fn default_port() -> u16 { 587 }

fn default_starttls() -> bool { true }

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid address {0:?}: {1}")]
  Address(String, #[source] lettre::address::AddressError),

  #[error("message has no recipients")]
  NoRecipients,

  #[error("failed to build message: {0}")]
  Build(#[from] lettre::error::Error),

  #[error("smtp error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Mailer ───────────────────────────────────────────────────────────────────

/// Sends [`OutgoingMail`] through an SMTP relay.
pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  sender:    Mailbox,
}

impl SmtpMailer {
  pub fn new(config: &MailConfig) -> Result<Self> {
    let sender = parse_mailbox(&config.sender)?;

    let mut builder = if config.starttls {
      AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.relay)?
    } else {
      AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.relay)
    };
    builder = builder.port(config.port);

    if !config.username.is_empty() {
      builder = builder.credentials(Credentials::new(
        config.username.clone(),
        config.password.clone(),
      ));
    }

    Ok(Self { transport: builder.build(), sender })
  }

  pub fn sender(&self) -> &Mailbox { &self.sender }
}

impl Mailer for SmtpMailer {
  type Error = Error;

  async fn send(&self, mail: &OutgoingMail) -> Result<()> {
    let message = build_message(&self.sender, mail)?;
    let response = self.transport.send(message).await?;
    tracing::debug!(
      recipients = mail.recipients.len(),
      code = %response.code(),
      "mail accepted by relay"
    );
    Ok(())
  }
}

/// Render `mail` into a `multipart/alternative` [`Message`] from `sender`.
pub fn build_message(sender: &Mailbox, mail: &OutgoingMail) -> Result<Message> {
  if mail.recipients.is_empty() {
    return Err(Error::NoRecipients);
  }

  let mut builder = Message::builder()
    .from(sender.clone())
    .subject(mail.subject.clone());

  for recipient in &mail.recipients {
    builder = builder.to(parse_mailbox(recipient)?);
  }

  Ok(builder.multipart(MultiPart::alternative_plain_html(
    mail.text_body.clone(),
    mail.html_body.clone(),
  ))?)
}

fn parse_mailbox(raw: &str) -> Result<Mailbox> {
  raw
    .parse()
    .map_err(|e| Error::Address(raw.to_owned(), e))
}

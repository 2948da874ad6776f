//! Outgoing mail and the [`Mailer`] transport abstraction.

use std::future::Future;

/// A message ready for delivery. The sender is a property of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
  pub subject:    String,
  pub recipients: Vec<String>,
  pub text_body:  String,
  pub html_body:  String,
}

/// A mail transport. Implemented by `codehint-mail` over SMTP.
pub trait Mailer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Deliver `mail` once. No retry.
  fn send<'a>(
    &'a self,
    mail: &'a OutgoingMail,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

//! The [`TextModel`] abstraction over a generative text model.

use std::future::Future;

/// Text-in, text-out access to a generative model. The model identifier is
/// part of the implementation's configuration.
pub trait TextModel: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run a single completion for `prompt` and return the generated text.
  fn generate<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

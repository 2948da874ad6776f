//! Runtime configuration.
//!
//! Sources, lowest precedence first: the TOML file named by `--config`
//! (optional), then `CODEHINT_*` environment variables with `__` separating
//! nested keys (e.g. `CODEHINT_MAIL__PASSWORD`, `CODEHINT_MODEL__API_KEY`).
//! Command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use codehint_api::OtpPolicy;
use codehint_gemini::GeminiConfig;
use codehint_mail::MailConfig;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:     String,
  #[serde(default = "default_port")]
  pub port:     u16,
  /// SQLite database file; created on first start.
  #[serde(default = "default_database")]
  pub database: PathBuf,
  pub mail:     MailConfig,
  pub model:    GeminiConfig,
  #[serde(default)]
  pub otp:      OtpPolicy,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_database() -> PathBuf { PathBuf::from("app.db") }

impl ServerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder().add_source(config::File::from(path).required(false)),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> anyhow::Result<Self> {
    let settings = builder
      .add_source(
        config::Environment::with_prefix("CODEHINT")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read configuration")?;

    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.otp.validate().context("invalid [otp] settings")?;
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

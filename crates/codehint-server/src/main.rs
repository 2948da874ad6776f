//! codehint-server binary.
//!
//! Reads `codehint.toml` (or the path given with `--config`) plus `CODEHINT_*`
//! environment variables, opens the SQLite store, builds the SMTP and Gemini
//! clients, and serves the JSON API over HTTP until Ctrl-C or SIGTERM.

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use codehint_api::AppState;
use codehint_gemini::GeminiClient;
use codehint_mail::SmtpMailer;
use codehint_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "codehint API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "codehint.toml")]
  config: PathBuf,

  /// Listen host (overrides config).
  #[arg(long)]
  host: Option<String>,

  /// Listen port (overrides config).
  #[arg(short, long)]
  port: Option<u16>,

  /// SQLite database path (overrides config).
  #[arg(long)]
  database: Option<PathBuf>,

  /// Emit logs as JSON lines.
  #[arg(long)]
  json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // A missing .env is fine; values may come from the real environment.
  dotenvy::dotenv().ok();

  let cli = Cli::parse();
  init_tracing(cli.json_logs);

  let mut cfg = ServerConfig::load(&cli.config)?;
  if let Some(host) = cli.host {
    cfg.host = host;
  }
  if let Some(port) = cli.port {
    cfg.port = port;
  }
  if let Some(database) = cli.database {
    cfg.database = database;
  }

  // Service objects, constructed once and injected into the router.
  let store = SqliteStore::open(&cfg.database)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.database))?;
  let mailer = SmtpMailer::new(&cfg.mail).context("failed to configure SMTP transport")?;
  let model = GeminiClient::new(cfg.model.clone()).context("failed to build model client")?;

  tracing::info!(
    database = %cfg.database.display(),
    relay = %cfg.mail.relay,
    model = model.model(),
    expose_otp = cfg.otp.expose_code,
    "services ready"
  );

  let store = Arc::new(store);
  let state = AppState {
    store:  Arc::clone(&store),
    mailer: Arc::new(mailer),
    model:  Arc::new(model),
    otp:    cfg.otp,
  };

  let app = codehint_api::api_router(state)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  // Teardown: the router and its state are gone once `serve` returns.
  match Arc::try_unwrap(store) {
    Ok(store) => store.close().await.context("failed to close store")?,
    Err(_) => tracing::warn!("store still referenced at shutdown; not closing explicitly"),
  }

  tracing::info!("shutdown complete");
  Ok(())
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  if json {
    tracing_subscriber::fmt().json().with_env_filter(filter).init();
  } else {
    tracing_subscriber::fmt().with_env_filter(filter).init();
  }
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to install Ctrl-C handler");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
  tracing::info!("shutdown signal received");
}

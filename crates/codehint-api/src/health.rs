//! `GET /health` liveness probe.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
  status:  &'static str,
  version: &'static str,
}

pub async fn handler() -> Json<HealthResponse> {
  Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

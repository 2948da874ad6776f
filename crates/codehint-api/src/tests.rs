//! Router tests against an in-memory store and recording fakes for the
//! mailer and the model.

use std::sync::{Arc, Mutex};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use codehint_core::{
  ledger::{Channel, QUESTION_PREFIX_LEN},
  mail::{Mailer, OutgoingMail},
  model::TextModel,
  otp::{OTP_MAX, OTP_MIN},
  prompt::{HINT_SUFFIX, SOLUTION_SUFFIX},
  store::AccountStore,
};
use codehint_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, OtpPolicy, api_router};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FakeError(&'static str);

#[derive(Default)]
struct RecordingMailer {
  sent: Mutex<Vec<OutgoingMail>>,
  fail: bool,
}

impl Mailer for RecordingMailer {
  type Error = FakeError;

  async fn send(&self, mail: &OutgoingMail) -> Result<(), FakeError> {
    if self.fail {
      return Err(FakeError("relay refused connection"));
    }
    self.sent.lock().unwrap().push(mail.clone());
    Ok(())
  }
}

#[derive(Default)]
struct EchoModel {
  prompts: Mutex<Vec<String>>,
  fail:    Option<&'static str>,
}

impl TextModel for EchoModel {
  type Error = FakeError;

  async fn generate(&self, prompt: &str) -> Result<String, FakeError> {
    self.prompts.lock().unwrap().push(prompt.to_owned());
    match self.fail {
      Some(msg) => Err(FakeError(msg)),
      None => Ok(format!("answer to: {prompt}")),
    }
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

struct Harness {
  store:  Arc<SqliteStore>,
  mailer: Arc<RecordingMailer>,
  model:  Arc<EchoModel>,
  otp:    OtpPolicy,
}

impl Harness {
  async fn new() -> Self {
    Self::with(RecordingMailer::default(), EchoModel::default()).await
  }

  async fn with(mailer: RecordingMailer, model: EchoModel) -> Self {
    Self {
      store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      mailer: Arc::new(mailer),
      model:  Arc::new(model),
      otp:    OtpPolicy::default(),
    }
  }

  fn router(&self) -> Router {
    api_router(AppState {
      store:  self.store.clone(),
      mailer: self.mailer.clone(),
      model:  self.model.clone(),
      otp:    self.otp,
    })
  }

  async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    let resp = self.router().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  fn sent(&self) -> Vec<OutgoingMail> { self.mailer.sent.lock().unwrap().clone() }

  fn prompts(&self) -> Vec<String> { self.model.prompts.lock().unwrap().clone() }
}

fn long_question(title: &str) -> String {
  format!("{}{title}", "#".repeat(QUESTION_PREFIX_LEN))
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
  let h = Harness::new().await;
  let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
  let resp = h.router().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
}

// ─── Send OTP ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_otp_mails_and_returns_code() {
  let h = Harness::new().await;

  let (status, body) = h.post("/api/send-otp", json!({ "email": "a@example.com" })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "OTP sent successfully");

  let otp = body["otp"].as_u64().expect("numeric otp") as u32;
  assert!((OTP_MIN..=OTP_MAX).contains(&otp), "{otp}");

  let sent = h.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].recipients, vec!["a@example.com".to_string()]);
  assert!(sent[0].text_body.contains(&otp.to_string()));
  assert!(sent[0].html_body.contains(&format!("<strong>{otp}</strong>")));
}

#[tokio::test]
async fn send_otp_without_email_is_rejected_without_side_effects() {
  let h = Harness::new().await;

  for body in [json!({}), json!({ "email": "" }), json!({ "email": null })] {
    let (status, resp) = h.post("/api/send-otp", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp, json!({ "error": "No email provided" }));
  }

  assert!(h.sent().is_empty());
  assert!(h.store.take_otp_challenge("").await.unwrap().is_none());
}

#[tokio::test]
async fn send_otp_can_withhold_code() {
  let mut h = Harness::new().await;
  h.otp.expose_code = false;

  let (status, body) = h.post("/api/send-otp", json!({ "email": "a@example.com" })).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.get("otp").is_none(), "{body}");
  assert_eq!(h.sent().len(), 1);
}

#[tokio::test]
async fn send_otp_mail_failure_is_internal_error() {
  let mailer = RecordingMailer { fail: true, ..Default::default() };
  let h = Harness::with(mailer, EchoModel::default()).await;

  let (status, body) = h.post("/api/send-otp", json!({ "email": "a@example.com" })).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "error": "internal server error" }));
}

#[tokio::test]
async fn send_otp_with_unrepresentable_ttl_is_internal_error() {
  let mut h = Harness::new().await;
  h.otp.ttl_secs = 1_000_000_000_000_000;

  let (status, body) = h.post("/api/send-otp", json!({ "email": "a@example.com" })).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "error": "internal server error" }));
  assert!(h.sent().is_empty());
  assert_eq!(h.store.count_otp_challenges().await.unwrap(), 0);
}

// ─── Verify OTP ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn verify_otp_accepts_issued_code_once() {
  let h = Harness::new().await;
  let (_, sent) = h.post("/api/send-otp", json!({ "email": "b@example.com" })).await;
  let otp = sent["otp"].clone();

  let (status, body) = h
    .post("/api/verify-otp", json!({ "email": "b@example.com", "otp": otp }))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "OTP verified successfully");
  assert_eq!(h.store.count_users().await.unwrap(), 1);

  let (status, body) = h
    .post("/api/verify-otp", json!({ "email": "b@example.com", "otp": otp }))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body, json!({ "error": "Invalid or expired OTP" }));
}

#[tokio::test]
async fn verify_otp_accepts_code_as_string() {
  let h = Harness::new().await;
  let (_, sent) = h.post("/api/send-otp", json!({ "email": "c@example.com" })).await;
  let otp = sent["otp"].as_u64().unwrap().to_string();

  let (status, _) = h
    .post("/api/verify-otp", json!({ "email": "c@example.com", "otp": otp }))
    .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn verify_otp_wrong_code_burns_challenge() {
  let h = Harness::new().await;
  let (_, sent) = h.post("/api/send-otp", json!({ "email": "d@example.com" })).await;
  let real = sent["otp"].as_u64().unwrap();
  let wrong = if real == OTP_MAX as u64 { real - 1 } else { real + 1 };

  let (status, _) = h
    .post("/api/verify-otp", json!({ "email": "d@example.com", "otp": wrong }))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = h
    .post("/api/verify-otp", json!({ "email": "d@example.com", "otp": real }))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(h.store.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn verify_otp_requires_both_fields() {
  let h = Harness::new().await;

  let (status, body) = h.post("/api/verify-otp", json!({ "otp": "123456" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "No email provided");

  let (status, body) = h.post("/api/verify-otp", json!({ "email": "e@example.com" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "No OTP provided");
}

// ─── Verify user ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn verify_user_is_idempotent() {
  let h = Harness::new().await;

  for _ in 0..3 {
    let (status, body) = h.post("/api/verify-user", json!({ "email": "f@example.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User verified and created successfully" }));
  }

  assert_eq!(h.store.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn verify_user_without_email_is_rejected() {
  let h = Harness::new().await;

  let (status, body) = h.post("/api/verify-user", json!({ "email": "" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body, json!({ "error": "No email provided" }));
  assert_eq!(h.store.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn mistyped_body_is_bad_request_with_json_error() {
  let h = Harness::new().await;

  for uri in ["/api/send-otp", "/api/verify-user", "/api/verify-otp", "/api/ask"] {
    let (status, body) = h.post(uri, json!({ "email": 5, "question": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    assert!(body["error"].is_string(), "{uri}: {body}");
  }
  assert!(h.sent().is_empty());
  assert!(h.prompts().is_empty());
  assert_eq!(h.store.count_users().await.unwrap(), 0);
}

// ─── Ask ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ask_hint_without_email_returns_result_and_records_nothing() {
  let h = Harness::new().await;

  let (status, body) = h
    .post("/api/ask", json!({ "question": "Two Sum", "mode": "hint" }))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["result"].is_string(), "{body}");

  assert_eq!(h.prompts(), vec![format!("Two Sum {HINT_SUFFIX}")]);
  assert_eq!(h.store.count_solved(Channel::Extension).await.unwrap(), 0);
  assert_eq!(h.store.count_solved(Channel::WithoutExtension).await.unwrap(), 0);
}

#[tokio::test]
async fn ask_returns_model_text_verbatim() {
  let h = Harness::new().await;

  let (_, body) = h
    .post("/api/ask", json!({ "question": "Two Sum", "mode": "solution" }))
    .await;
  assert_eq!(body, json!({ "result": format!("answer to: Two Sum {SOLUTION_SUFFIX}") }));
}

#[tokio::test]
async fn ask_without_mode_passes_question_through() {
  let h = Harness::new().await;

  let (status, _) = h.post("/api/ask", json!({ "question": "raw prompt" })).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = h
    .post("/api/ask", json!({ "question": "raw prompt", "mode": "suggestions" }))
    .await;
  assert_eq!(status, StatusCode::OK);

  assert_eq!(h.prompts(), vec!["raw prompt".to_string(), "raw prompt".to_string()]);
}

#[tokio::test]
async fn ask_without_question_is_rejected_before_model() {
  let h = Harness::new().await;

  let (status, body) = h.post("/api/ask", json!({ "mode": "hint" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body, json!({ "error": "No question provided" }));
  assert!(h.prompts().is_empty());
}

#[tokio::test]
async fn ask_with_known_email_records_truncated_title() {
  let h = Harness::new().await;
  let (user, _) = h.store.get_or_create_user("g@example.com").await.unwrap();

  let (status, _) = h
    .post(
      "/api/ask",
      json!({ "question": long_question("Longest Substring"), "mode": "explain", "email": "g@example.com" }),
    )
    .await;
  assert_eq!(status, StatusCode::OK);

  let rows = h.store.list_solved(user.id, Channel::Extension).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].question_title, "Longest Substring");
  assert!(h.store.list_solved(user.id, Channel::WithoutExtension).await.unwrap().is_empty());
}

#[tokio::test]
async fn ask_with_unknown_email_answers_without_recording() {
  let h = Harness::new().await;

  let (status, body) = h
    .post(
      "/api/ask",
      json!({ "question": long_question("Two Sum"), "mode": "hint", "email": "nobody@example.com" }),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["result"].is_string());

  assert_eq!(h.store.count_solved(Channel::Extension).await.unwrap(), 0);
  assert_eq!(h.store.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn ask_model_failure_is_500_with_upstream_text_and_still_records() {
  let model = EchoModel { fail: Some("429 RESOURCE_EXHAUSTED. quota"), ..Default::default() };
  let h = Harness::with(RecordingMailer::default(), model).await;
  let (user, _) = h.store.get_or_create_user("h@example.com").await.unwrap();

  let (status, body) = h
    .post(
      "/api/ask",
      json!({ "question": long_question("Two Sum"), "mode": "solution", "email": "h@example.com" }),
    )
    .await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "error": "429 RESOURCE_EXHAUSTED. quota" }));

  let rows = h.store.list_solved(user.id, Channel::Extension).await.unwrap();
  assert_eq!(rows.len(), 1);
}

//! Structured generation client.
//!
//! `ModelBackend` is the transport seam (the OpenAI-compatible HTTP client in
//! production, stubs in tests). `StructuredClient` sits on top of it: it declares the
//! output mode, validates schema-mode payloads into a `StudyPackage`, and logs the two
//! failure classes distinctly. Calls are stateless; nothing is cached or retried.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::domain::StudyPackage;
use crate::error::StudyError;
use crate::schema::parse_study_package;
use crate::util::trunc_for_log;

/// What the model is asked to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
  /// Machine-parseable JSON constrained by the study package schema.
  Schema,
  FreeText,
}

/// One outbound model call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
  pub system: Option<String>,
  pub instruction: String,
  pub temperature: f32,
  pub mode: OutputMode,
}

/// Transport to a hosted model. Implementations return the raw message text or
/// `GenerationFailed`; they never parse the payload.
#[async_trait]
pub trait ModelBackend: Send + Sync {
  async fn complete(&self, request: &CompletionRequest) -> Result<String, StudyError>;

  /// Short description for startup logs.
  fn describe(&self) -> String;
}

/// Backend used when no API key is configured: every call fails fast.
pub struct DisabledBackend;

#[async_trait]
impl ModelBackend for DisabledBackend {
  async fn complete(&self, _request: &CompletionRequest) -> Result<String, StudyError> {
    Err(StudyError::generation("model backend disabled (OPENAI_API_KEY not set)"))
  }

  fn describe(&self) -> String {
    "disabled".into()
  }
}

/// Result of a generation, shaped by the requested `OutputMode`.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
  Package(StudyPackage),
  Text(String),
}

impl Generated {
  pub fn into_package(self) -> Result<StudyPackage, StudyError> {
    match self {
      Self::Package(p) => Ok(p),
      Self::Text(_) => Err(StudyError::malformed("expected a study package, got free text")),
    }
  }

  pub fn into_text(self) -> Result<String, StudyError> {
    match self {
      Self::Text(t) => Ok(t),
      Self::Package(_) => Err(StudyError::malformed("expected free text, got a study package")),
    }
  }
}

#[derive(Clone)]
pub struct StructuredClient {
  backend: Arc<dyn ModelBackend>,
}

impl StructuredClient {
  pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
    Self { backend }
  }

  pub fn describe(&self) -> String {
    self.backend.describe()
  }

  /// Issue one call. Schema mode validates into a `StudyPackage`; free-text mode
  /// returns the trimmed text as-is.
  #[instrument(level = "info", skip(self, system, instruction), fields(instr_len = instruction.len()))]
  pub async fn generate(
    &self,
    system: Option<&str>,
    instruction: &str,
    mode: OutputMode,
    temperature: f32,
  ) -> Result<Generated, StudyError> {
    let request = CompletionRequest {
      system: system.filter(|s| !s.trim().is_empty()).map(str::to_string),
      instruction: instruction.to_string(),
      temperature,
      mode,
    };

    let start = Instant::now();
    let raw = match self.backend.complete(&request).await {
      Ok(raw) => raw,
      Err(e) => {
        let e = match e {
          StudyError::GenerationFailed { .. } | StudyError::MalformedOutput { .. } => e,
          other => StudyError::generation(other.to_string()),
        };
        error!(elapsed = ?start.elapsed(), kind = e.kind(), error = %e, "Model call failed");
        return Err(e);
      }
    };
    info!(elapsed = ?start.elapsed(), resp_len = raw.len(), "Model response received");

    match mode {
      OutputMode::FreeText => Ok(Generated::Text(raw.trim().to_string())),
      OutputMode::Schema => match parse_study_package(&raw) {
        Ok(pkg) => Ok(Generated::Package(pkg)),
        Err(e) => {
          error!(kind = e.kind(), error = %e, preview = %trunc_for_log(&raw, 80), "Model output does not match the study package schema");
          Err(e)
        }
      },
    }
  }
}

#[cfg(test)]
pub(crate) mod testing {
  //! Stub backends shared by the unit tests.

  use std::collections::VecDeque;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;

  use tokio::sync::oneshot;

  use super::*;

  /// Replies from a queue and records every request.
  #[derive(Default)]
  pub struct StubBackend {
    replies: Mutex<VecDeque<Result<String, StudyError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
  }

  impl StubBackend {
    pub fn replying(replies: impl IntoIterator<Item = Result<String, StudyError>>) -> Arc<Self> {
      Arc::new(Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() })
    }

    pub fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
      self.requests.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl ModelBackend for StubBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, StudyError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.requests.lock().unwrap().push(request.clone());
      self.replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(StudyError::generation("stub exhausted")))
    }

    fn describe(&self) -> String {
      "stub".into()
    }
  }

  /// Each call parks until the test releases it, so completion order is controlled.
  #[derive(Default)]
  pub struct GatedBackend {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<String, StudyError>>>>,
    calls: AtomicUsize,
  }

  impl GatedBackend {
    /// Returns the backend and one sender per expected call, in call order.
    pub fn new(n: usize) -> (Arc<Self>, Vec<oneshot::Sender<Result<String, StudyError>>>) {
      let mut senders = Vec::new();
      let mut gates = VecDeque::new();
      for _ in 0..n {
        let (tx, rx) = oneshot::channel();
        senders.push(tx);
        gates.push_back(rx);
      }
      (Arc::new(Self { gates: Mutex::new(gates), calls: AtomicUsize::new(0) }), senders)
    }

    pub fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl ModelBackend for GatedBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, StudyError> {
      let gate = self.gates.lock().unwrap().pop_front();
      self.calls.fetch_add(1, Ordering::SeqCst);
      match gate {
        Some(rx) => rx.await.unwrap_or_else(|_| Err(StudyError::generation("gate dropped"))),
        None => Err(StudyError::generation("no gate left")),
      }
    }

    fn describe(&self) -> String {
      "gated".into()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::testing::StubBackend;
  use super::*;
  use crate::schema::tests::sample_package_json;

  #[tokio::test]
  async fn schema_mode_returns_a_validated_package() {
    let stub = StubBackend::replying([Ok(sample_package_json().to_string())]);
    let client = StructuredClient::new(stub.clone());
    let out = client.generate(Some("sys"), "make it", OutputMode::Schema, 0.5).await.unwrap();
    let pkg = out.into_package().unwrap();
    assert_eq!(pkg.practice_test.len(), 3);

    let req = &stub.requests()[0];
    assert_eq!(req.mode, OutputMode::Schema);
    assert_eq!(req.temperature, 0.5);
    assert_eq!(req.system.as_deref(), Some("sys"));
  }

  #[tokio::test]
  async fn schema_mode_rejects_missing_required_fields() {
    let mut v = sample_package_json();
    v.as_object_mut().unwrap().remove("studySuggestions");
    let client = StructuredClient::new(StubBackend::replying([Ok(v.to_string())]));
    let err = client.generate(None, "x", OutputMode::Schema, 0.5).await.unwrap_err();
    assert!(matches!(err, StudyError::MalformedOutput { .. }));
  }

  #[tokio::test]
  async fn free_text_is_trimmed_but_not_validated() {
    let client = StructuredClient::new(StubBackend::replying([Ok("  \"**Quang hợp**\"\n".into())]));
    let out = client.generate(None, "x", OutputMode::FreeText, 0.7).await.unwrap();
    assert_eq!(out, Generated::Text("\"**Quang hợp**\"".into()));
  }

  #[tokio::test]
  async fn backend_errors_surface_as_generation_failed() {
    let client = StructuredClient::new(StubBackend::replying([Err(StudyError::generation("HTTP 429"))]));
    let err = client.generate(None, "x", OutputMode::Schema, 0.5).await.unwrap_err();
    assert_eq!(err, StudyError::generation("HTTP 429"));
  }

  #[tokio::test]
  async fn blank_system_is_not_sent() {
    let stub = StubBackend::replying([Ok("ok".into())]);
    let client = StructuredClient::new(stub.clone());
    client.generate(Some("  "), "x", OutputMode::FreeText, 0.7).await.unwrap();
    assert_eq!(stub.requests()[0].system, None);
  }

  #[tokio::test]
  async fn disabled_backend_fails_fast() {
    let client = StructuredClient::new(Arc::new(DisabledBackend));
    let err = client.generate(None, "x", OutputMode::FreeText, 0.7).await.unwrap_err();
    assert!(matches!(err, StudyError::GenerationFailed { .. }));
  }

  #[test]
  fn wrong_variant_is_malformed() {
    assert!(matches!(Generated::Text("x".into()).into_package(), Err(StudyError::MalformedOutput { .. })));
  }
}

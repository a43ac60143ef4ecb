//! Per-caller orchestration: the form configuration, the current study package, and
//! one request state machine per request kind.
//!
//! Each kind moves Idle -> Pending -> {Success, Failed}; a new request of that kind
//! moves it back to Pending. Every request takes a ticket; a completion whose ticket
//! was superseded is discarded and reported as `StudyError::Superseded`. The lock is
//! only held for transitions, never across the model call, so the three kinds run
//! independently.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::domain::{RequestKind, StudyConfiguration, StudyPackage};
use crate::error::StudyError;
use crate::logic;
use crate::prompt::MISSING_TOPIC_MESSAGE;
use crate::state::AppState;

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
  #[default]
  Idle,
  Pending,
  Success,
  Failed,
}

#[derive(Clone, Copy, Debug, Default)]
struct KindState {
  status: RequestStatus,
  ticket: u64,
}

impl KindState {
  fn begin(&mut self) -> u64 {
    self.ticket += 1;
    self.status = RequestStatus::Pending;
    self.ticket
  }

  /// Returns false when `ticket` is stale; the state is then left untouched.
  fn finish(&mut self, ticket: u64, ok: bool) -> bool {
    if ticket != self.ticket {
      return false;
    }
    self.status = if ok { RequestStatus::Success } else { RequestStatus::Failed };
    true
  }
}

#[derive(Debug)]
struct SessionState {
  config: StudyConfiguration,
  package: Option<StudyPackage>,
  summary_error: Option<String>,
  summary: KindState,
  topic: KindState,
  objectives: KindState,
}

impl SessionState {
  fn kind_mut(&mut self, kind: RequestKind) -> &mut KindState {
    match kind {
      RequestKind::Summary => &mut self.summary,
      RequestKind::TopicSuggestion => &mut self.topic,
      RequestKind::ObjectivesSuggestion => &mut self.objectives,
    }
  }
}

/// Per-kind view exposed to callers.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KindSnapshot {
  pub status: RequestStatus,
  pub in_flight: bool,
}

impl From<KindState> for KindSnapshot {
  fn from(k: KindState) -> Self {
    Self { status: k.status, in_flight: k.status == RequestStatus::Pending }
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub config: StudyConfiguration,
  pub summary: Option<StudyPackage>,
  pub summary_error: Option<String>,
  pub summary_request: KindSnapshot,
  pub topic_request: KindSnapshot,
  pub objectives_request: KindSnapshot,
}

/// Cloneable handle; clones share the same session.
#[derive(Clone)]
pub struct StudySession {
  app: Arc<AppState>,
  inner: Arc<RwLock<SessionState>>,
}

impl StudySession {
  pub fn new(app: Arc<AppState>) -> Self {
    let config = app.catalog.defaults.clone();
    Self::with_config(app, config)
  }

  pub fn with_config(app: Arc<AppState>, config: StudyConfiguration) -> Self {
    let state = SessionState {
      config,
      package: None,
      summary_error: None,
      summary: KindState::default(),
      topic: KindState::default(),
      objectives: KindState::default(),
    };
    Self { app, inner: Arc::new(RwLock::new(state)) }
  }

  pub async fn snapshot(&self) -> SessionSnapshot {
    let s = self.inner.read().await;
    SessionSnapshot {
      config: s.config.clone(),
      summary: s.package.clone(),
      summary_error: s.summary_error.clone(),
      summary_request: s.summary.into(),
      topic_request: s.topic.into(),
      objectives_request: s.objectives.into(),
    }
  }

  pub async fn update_config(&self, config: StudyConfiguration) {
    self.inner.write().await.config = config;
  }

  /// Drop the current package and any summary error.
  pub async fn clear_summary(&self) {
    let mut s = self.inner.write().await;
    s.package = None;
    s.summary_error = None;
  }

  /// Generate a new study package for `config`. Replaces the current package on
  /// success; keeps it on failure.
  #[instrument(level = "info", skip(self, config), fields(subject = %config.subject, mcq = config.mcq_count, essay = config.essay_count))]
  pub async fn request_summary(&self, config: StudyConfiguration) -> Result<StudyPackage, StudyError> {
    let ticket = {
      let mut s = self.inner.write().await;
      if s.summary.status == RequestStatus::Pending {
        return Err(StudyError::SummaryInFlight);
      }
      s.config = config.clone();
      s.summary_error = None;
      s.summary.begin()
    };

    let result = logic::generate_summary(&self.app, &config).await;

    let mut s = self.inner.write().await;
    if !s.summary.finish(ticket, result.is_ok()) {
      debug!(target: "study", ticket, "Discarding stale summary response");
      return Err(StudyError::Superseded);
    }
    match result {
      Ok(package) => {
        s.package = Some(package.clone());
        info!(target: "study", ticket, "Summary applied");
        Ok(package)
      }
      Err(e) => {
        log_failure(RequestKind::Summary, &e);
        s.summary_error = Some(e.user_message(RequestKind::Summary));
        Err(e)
      }
    }
  }

  /// Suggest a main topic; on success it becomes the session's `main_topic`.
  #[instrument(level = "info", skip(self))]
  pub async fn request_topic_suggestion(&self, subject: &str, grade: &str, textbook: &str) -> Result<String, StudyError> {
    let kind = RequestKind::TopicSuggestion;
    let ticket = self.inner.write().await.topic.begin();
    let result = logic::suggest_topic(&self.app, subject, grade, textbook).await;
    self.complete_suggestion(kind, ticket, result, |cfg, topic| cfg.main_topic = topic).await
  }

  /// Suggest learning objectives; on success they become the session's
  /// `learning_objectives`. A blank `main_topic` fails before any state change.
  #[instrument(level = "info", skip(self))]
  pub async fn request_objectives_suggestion(
    &self,
    subject: &str,
    grade: &str,
    textbook: &str,
    main_topic: &str,
  ) -> Result<String, StudyError> {
    let kind = RequestKind::ObjectivesSuggestion;
    if main_topic.trim().is_empty() {
      return Err(StudyError::PreconditionFailed(MISSING_TOPIC_MESSAGE.into()));
    }
    let ticket = self.inner.write().await.objectives.begin();
    let result = logic::suggest_objectives(&self.app, subject, grade, textbook, main_topic).await;
    self.complete_suggestion(kind, ticket, result, |cfg, objectives| cfg.learning_objectives = objectives).await
  }

  async fn complete_suggestion(
    &self,
    kind: RequestKind,
    ticket: u64,
    result: Result<String, StudyError>,
    apply: impl FnOnce(&mut StudyConfiguration, String),
  ) -> Result<String, StudyError> {
    let mut s = self.inner.write().await;
    if !s.kind_mut(kind).finish(ticket, result.is_ok()) {
      debug!(target: "study", kind = kind.as_str(), ticket, "Discarding stale suggestion");
      return Err(StudyError::Superseded);
    }
    match result {
      Ok(text) => {
        apply(&mut s.config, text.clone());
        Ok(text)
      }
      Err(e) => {
        log_failure(kind, &e);
        Err(e)
      }
    }
  }
}

/// GenerationFailed and MalformedOutput look the same to the caller; the `kind` field tells them apart.
fn log_failure(request: RequestKind, e: &StudyError) {
  error!(target: "study", request = request.as_str(), kind = e.kind(), error = %e, "Request failed");
}

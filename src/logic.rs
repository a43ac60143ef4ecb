//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Each operation renders its prompt, issues one generation call, and normalizes the
//! result:
//!   - full summary + practice test (schema-constrained)
//!   - topic suggestion (free text, cleaned to a bare topic name)
//!   - objectives suggestion (free text "- " list; requires a main topic)
//!
//! Nothing here holds state between calls.

use tracing::{info, instrument, warn};

use crate::domain::{StudyConfiguration, StudyPackage};
use crate::error::StudyError;
use crate::generation::{Generated, OutputMode};
use crate::postprocess::{clean_objectives, clean_suggestion};
use crate::prompt::{build_instruction, system_for, PromptRequest};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Render the prompt for `request` and issue one call at the kind's temperature.
async fn run(state: &AppState, request: PromptRequest<'_>, mode: OutputMode) -> Result<Generated, StudyError> {
  let kind = request.kind();
  let instruction = build_instruction(&state.prompts, &request)?;
  state.client
    .generate(Some(system_for(&state.prompts, kind)), &instruction, mode, kind.temperature())
    .await
}

#[instrument(level = "info", skip(state, config), fields(subject = %config.subject, grade = %config.grade, mcq = config.mcq_count, essay = config.essay_count))]
pub async fn generate_summary(state: &AppState, config: &StudyConfiguration) -> Result<StudyPackage, StudyError> {
  let package = run(state, PromptRequest::Summary(config), OutputMode::Schema).await?.into_package()?;

  // The requested split is a request to the model, not a structural guarantee.
  let (mcq, essay) = package.question_split();
  if mcq != config.mcq_count as usize || essay != config.essay_count as usize {
    warn!(target: "study", requested_mcq = config.mcq_count, requested_essay = config.essay_count, got_mcq = mcq, got_essay = essay, "Practice test split differs from request");
  }
  info!(target: "study", concepts = package.core_concepts.len(), questions = package.practice_test.len(), "Study package generated");
  Ok(package)
}

#[instrument(level = "info", skip(state))]
pub async fn suggest_topic(state: &AppState, subject: &str, grade: &str, textbook: &str) -> Result<String, StudyError> {
  let request = PromptRequest::Topic { subject, grade, textbook };
  let raw = run(state, request, OutputMode::FreeText).await?.into_text()?;
  let topic = clean_suggestion(&raw);
  info!(target: "study", topic = %trunc_for_log(&topic, 60), "Topic suggested");
  Ok(topic)
}

/// Fails with `PreconditionFailed` before any network call when `main_topic` is blank.
#[instrument(level = "info", skip(state))]
pub async fn suggest_objectives(
  state: &AppState,
  subject: &str,
  grade: &str,
  textbook: &str,
  main_topic: &str,
) -> Result<String, StudyError> {
  let request = PromptRequest::Objectives { subject, grade, textbook, main_topic };
  let raw = run(state, request, OutputMode::FreeText).await?.into_text()?;
  let objectives = clean_objectives(&raw);
  info!(target: "study", lines = objectives.lines().count(), "Objectives suggested");
  Ok(objectives)
}

#[cfg(test)]
pub(crate) mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::config::{Catalog, Prompts};
  use crate::generation::testing::StubBackend;
  use crate::generation::ModelBackend;
  use crate::schema::tests::sample_package_json;

  pub(crate) fn state_with(backend: Arc<dyn ModelBackend>) -> AppState {
    AppState::with_backend(backend, Prompts::default(), Catalog::default())
  }

  #[tokio::test]
  async fn summary_uses_schema_mode_at_half_temperature() {
    let stub = StubBackend::replying([Ok(sample_package_json().to_string())]);
    let state = state_with(stub.clone());
    let pkg = generate_summary(&state, &StudyConfiguration::default()).await.unwrap();
    assert_eq!(pkg.practice_test.len(), 3);

    let req = &stub.requests()[0];
    assert_eq!(req.mode, OutputMode::Schema);
    assert_eq!(req.temperature, 0.5);
    assert!(req.instruction.contains("16 câu hỏi trắc nghiệm"));
  }

  #[tokio::test]
  async fn topic_is_cleaned() {
    let stub = StubBackend::replying([Ok("\"**Quang hợp**\"".into())]);
    let state = state_with(stub.clone());
    let topic = suggest_topic(&state, "Sinh học", "Lớp 11", "Cánh Diều").await.unwrap();
    assert_eq!(topic, "Quang hợp");
    assert_eq!(stub.requests()[0].temperature, 0.7);
    assert_eq!(stub.requests()[0].mode, OutputMode::FreeText);
  }

  #[tokio::test]
  async fn objectives_without_topic_never_reach_the_network() {
    let stub = StubBackend::replying([Ok("- x".into())]);
    let state = state_with(stub.clone());
    let err = suggest_objectives(&state, "Sinh học", "Lớp 11", "Cánh Diều", "").await.unwrap_err();
    assert!(matches!(err, StudyError::PreconditionFailed(_)));
    assert_eq!(stub.calls(), 0);
  }

  #[tokio::test]
  async fn objectives_keep_list_markers() {
    let stub = StubBackend::replying([Ok("- Hiểu cơ chế.\n\n- Vận dụng.\n".into())]);
    let state = state_with(stub.clone());
    let out = suggest_objectives(&state, "Sinh học", "Lớp 11", "Cánh Diều", "Quang hợp").await.unwrap();
    assert_eq!(out, "- Hiểu cơ chế.\n- Vận dụng.");
    assert_eq!(stub.requests()[0].temperature, 0.6);
  }
}

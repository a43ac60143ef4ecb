//! HTTP endpoint handlers. These are thin, stateless wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::State,
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::domain::{RequestKind, StudyConfiguration, StudyPackage};
use crate::error::StudyError;
use crate::export::{export_file_name, format_export_document};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

/// A failed request, rendered as `{kind, message}` with the localized message only.
#[derive(Debug)]
pub struct ApiError {
  request: RequestKind,
  error: StudyError,
}

impl ApiError {
  fn for_request(request: RequestKind) -> impl FnOnce(StudyError) -> Self {
    move |error| Self { request, error }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match self.error {
      StudyError::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
      StudyError::SummaryInFlight | StudyError::Superseded => StatusCode::CONFLICT,
      StudyError::GenerationFailed { .. } | StudyError::MalformedOutput { .. } => StatusCode::BAD_GATEWAY,
    };
    let body = ErrorOut { kind: self.error.kind().to_string(), message: self.error.user_message(self.request) };
    (status, Json(body)).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(OptionsOut::from(&state.catalog))
}

#[instrument(level = "info", skip(state, body), fields(subject = %body.subject, mcq = body.mcq_count, essay = body.essay_count))]
pub async fn http_post_summary(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StudyConfiguration>,
) -> Result<Json<StudyPackage>, ApiError> {
  let pkg = generate_summary(&state, &body).await.map_err(ApiError::for_request(RequestKind::Summary))?;
  info!(target: "study", questions = pkg.practice_test.len(), "HTTP summary served");
  Ok(Json(pkg))
}

#[instrument(level = "info", skip(state, body), fields(subject = %body.subject))]
pub async fn http_post_suggest_topic(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TopicIn>,
) -> Result<Json<TopicOut>, ApiError> {
  let topic = suggest_topic(&state, &body.subject, &body.grade, &body.textbook)
    .await
    .map_err(ApiError::for_request(RequestKind::TopicSuggestion))?;
  Ok(Json(TopicOut { topic }))
}

#[instrument(level = "info", skip(state, body), fields(subject = %body.subject, topic_len = body.main_topic.len()))]
pub async fn http_post_suggest_objectives(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ObjectivesIn>,
) -> Result<Json<ObjectivesOut>, ApiError> {
  let objectives = suggest_objectives(&state, &body.subject, &body.grade, &body.textbook, &body.main_topic)
    .await
    .map_err(ApiError::for_request(RequestKind::ObjectivesSuggestion))?;
  Ok(Json(ObjectivesOut { objectives }))
}

#[instrument(level = "info", skip(body), fields(topic_len = body.main_topic.len(), questions = body.summary.practice_test.len()))]
pub async fn http_post_export(Json(body): Json<ExportIn>) -> impl IntoResponse {
  let text = format_export_document(&body.main_topic, &body.summary);
  let disposition = format!("attachment; filename=\"{}\"", export_file_name(&body.main_topic));
  (
    [
      (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    text,
  )
}

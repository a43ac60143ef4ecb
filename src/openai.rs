//! Minimal OpenAI-compatible chat-completions backend.
//!
//! We only call chat.completions and request either plain text or a JSON object
//! constrained by a declared JSON schema. The default base URL is Gemini's
//! OpenAI-compatible endpoint, but any compatible provider works.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::StudyError;
use crate::generation::{CompletionRequest, ModelBackend, OutputMode};
use crate::schema::{study_package_schema, STUDY_PACKAGE_SCHEMA_NAME};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 90;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// `Ok(None)` when OPENAI_API_KEY is absent or blank; `Err` when the HTTP client cannot be built.
  pub fn from_env() -> Result<Option<Self>, reqwest::Error> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Option<Self>, reqwest::Error> {
    let Some(api_key) = get("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) else {
      return Ok(None);
    };
    let base_url = get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
    let model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
    let timeout = get("OPENAI_TIMEOUT_SECS")
      .and_then(|s| s.parse::<u64>().ok())
      .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Self::new(api_key, base_url, model, Duration::from_secs(timeout)).map(Some)
  }

  pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let base_url = base_url.trim_end_matches('/').to_string();
    Ok(Self { client, api_key, base_url, model })
  }

  fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
      messages.push(ChatMessageReq { role: "system".into(), content: system.clone() });
    }
    messages.push(ChatMessageReq { role: "user".into(), content: request.instruction.clone() });

    let response_format = match request.mode {
      OutputMode::Schema => Some(ResponseFormat::JsonSchema {
        json_schema: JsonSchemaFormat {
          name: STUDY_PACKAGE_SCHEMA_NAME.into(),
          schema: study_package_schema(),
          strict: false,
        },
      }),
      OutputMode::FreeText => None,
    };

    ChatCompletionRequest {
      model: self.model.clone(),
      messages,
      temperature: request.temperature,
      response_format,
      max_tokens: None,
    }
  }
}

#[async_trait]
impl ModelBackend for OpenAI {
  #[instrument(level = "info", skip(self, request), fields(model = %self.model, mode = ?request.mode, temperature = request.temperature))]
  async fn complete(&self, request: &CompletionRequest) -> Result<String, StudyError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = self.build_request(request);

    let res = self.client.post(&url)
      .header(USER_AGENT, "ontap-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| StudyError::generation(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(StudyError::generation(format!("HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res.json().await
      .map_err(|e| StudyError::generation(format!("invalid completion envelope: {e}")))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Model usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    if text.trim().is_empty() && request.mode == OutputMode::Schema {
      return Err(StudyError::malformed("empty completion"));
    }
    Ok(text)
  }

  fn describe(&self) -> String {
    format!("{} ({})", self.base_url, self.model)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
  JsonSchema { json_schema: JsonSchemaFormat },
}
#[derive(Serialize)]
struct JsonSchemaFormat { name: String, schema: serde_json::Value, strict: bool }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
/// Gemini's compatibility layer sometimes wraps the object in a one-element array.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  if let Ok(w) = serde_json::from_str::<EWrap>(body) {
    return Some(w.error.message);
  }
  serde_json::from_str::<Vec<EWrap>>(body)
    .ok()
    .and_then(|v| v.into_iter().next())
    .map(|w| w.error.message)
}

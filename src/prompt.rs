//! Prompt builder: renders a configuration into the instruction for one request kind.
//!
//! Pure functions only; no I/O. Templates come from `config::Prompts`.

use crate::config::Prompts;
use crate::domain::{RequestKind, StudyConfiguration};
use crate::error::StudyError;
use crate::util::fill_template;

pub const MISSING_TOPIC_MESSAGE: &str = "Vui lòng nhập Chủ đề chính trước khi nhận gợi ý Mục tiêu học tập.";

/// Input for one of the three request kinds.
#[derive(Debug, Clone, Copy)]
pub enum PromptRequest<'a> {
  Summary(&'a StudyConfiguration),
  Topic { subject: &'a str, grade: &'a str, textbook: &'a str },
  Objectives { subject: &'a str, grade: &'a str, textbook: &'a str, main_topic: &'a str },
}

impl PromptRequest<'_> {
  pub fn kind(&self) -> RequestKind {
    match self {
      Self::Summary(_) => RequestKind::Summary,
      Self::Topic { .. } => RequestKind::TopicSuggestion,
      Self::Objectives { .. } => RequestKind::ObjectivesSuggestion,
    }
  }
}

/// Single dispatch over the three request kinds.
pub fn build_instruction(prompts: &Prompts, request: &PromptRequest<'_>) -> Result<String, StudyError> {
  match *request {
    PromptRequest::Summary(cfg) => Ok(build_summary_prompt(prompts, cfg)),
    PromptRequest::Topic { subject, grade, textbook } => Ok(build_topic_prompt(prompts, subject, grade, textbook)),
    PromptRequest::Objectives { subject, grade, textbook, main_topic } => {
      build_objectives_prompt(prompts, subject, grade, textbook, main_topic)
    }
  }
}

/// Full summary + practice test instruction. A zero question count is still asked for explicitly.
pub fn build_summary_prompt(prompts: &Prompts, cfg: &StudyConfiguration) -> String {
  let mcq = cfg.mcq_count.to_string();
  let essay = cfg.essay_count.to_string();
  let total = cfg.total_questions().to_string();
  let mut out = fill_template(
    &prompts.summary_user_template,
    &[
      ("subject", cfg.subject.as_str()),
      ("grade", cfg.grade.as_str()),
      ("textbook", cfg.textbook.as_str()),
      ("main_topic", cfg.main_topic.as_str()),
      ("learning_objectives", cfg.learning_objectives.as_str()),
      ("mcq_count", mcq.as_str()),
      ("essay_count", essay.as_str()),
      ("total_questions", total.as_str()),
      ("mcq_difficulty", cfg.mcq_difficulty.label()),
    ],
  );
  if cfg.total_questions() == 0 {
    out.push_str("\n\n");
    out.push_str(&prompts.empty_practice_test_note);
  }
  out
}

pub fn build_topic_prompt(prompts: &Prompts, subject: &str, grade: &str, textbook: &str) -> String {
  fill_template(
    &prompts.topic_user_template,
    &[("subject", subject), ("grade", grade), ("textbook", textbook)],
  )
}

/// Fails with `PreconditionFailed` when the main topic is blank.
pub fn build_objectives_prompt(
  prompts: &Prompts,
  subject: &str,
  grade: &str,
  textbook: &str,
  main_topic: &str,
) -> Result<String, StudyError> {
  let main_topic = main_topic.trim();
  if main_topic.is_empty() {
    return Err(StudyError::PreconditionFailed(MISSING_TOPIC_MESSAGE.into()));
  }
  Ok(fill_template(
    &prompts.objectives_user_template,
    &[("subject", subject), ("grade", grade), ("textbook", textbook), ("main_topic", main_topic)],
  ))
}

/// System message paired with each request kind.
pub fn system_for(prompts: &Prompts, kind: RequestKind) -> &str {
  match kind {
    RequestKind::Summary => &prompts.summary_system,
    RequestKind::TopicSuggestion => &prompts.topic_system,
    RequestKind::ObjectivesSuggestion => &prompts.objectives_system,
  }
}

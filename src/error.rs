//! Error taxonomy shared by the prompt builder, the generation client and the session.
//!
//! The raw cause of a failure is kept for logs only; callers get a short localized
//! message from `user_message`.

use crate::domain::RequestKind;

/// Everything a study request can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudyError {
  /// Required input missing; no network call was attempted.
  #[error("precondition failed: {0}")]
  PreconditionFailed(String),

  /// The model service did not complete the call (network, auth, quota, timeout, non-2xx).
  #[error("generation failed: {cause}")]
  GenerationFailed { cause: String },

  /// The service answered but the payload does not match the study package shape.
  #[error("malformed model output: {reason}")]
  MalformedOutput { reason: String },

  /// A summary request is already pending for this session.
  #[error("a summary request is already in flight")]
  SummaryInFlight,

  /// A newer request of the same kind was issued before this one completed.
  #[error("response superseded by a newer request")]
  Superseded,
}

impl StudyError {
  pub fn generation(cause: impl Into<String>) -> Self {
    Self::GenerationFailed { cause: cause.into() }
  }

  pub fn malformed(reason: impl Into<String>) -> Self {
    Self::MalformedOutput { reason: reason.into() }
  }

  /// Stable machine-readable tag used on the wire and in log fields.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::PreconditionFailed(_) => "precondition_failed",
      Self::GenerationFailed { .. } => "generation_failed",
      Self::MalformedOutput { .. } => "malformed_output",
      Self::SummaryInFlight => "summary_in_flight",
      Self::Superseded => "superseded",
    }
  }

  /// Localized text shown to the user. Never contains the raw cause.
  pub fn user_message(&self, request: RequestKind) -> String {
    match self {
      Self::PreconditionFailed(msg) => msg.clone(),
      Self::GenerationFailed { .. } | Self::MalformedOutput { .. } => request.failure_message().to_string(),
      Self::SummaryInFlight => "Đang tạo tóm tắt, vui lòng đợi.".to_string(),
      Self::Superseded => "Yêu cầu đã được thay thế bởi yêu cầu mới hơn.".to_string(),
    }
  }
}

//! Domain models: the study configuration (input), the study package (output) and
//! the request kinds that move between them.

use serde::{Deserialize, Serialize};

/// Difficulty requested for the multiple-choice part of the practice test.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum McqDifficulty {
  #[serde(rename = "Dễ")]
  Easy,
  #[default]
  #[serde(rename = "Trung bình")]
  Medium,
  #[serde(rename = "Khó")]
  Hard,
  #[serde(rename = "Tổng hợp")]
  Mixed,
}

impl McqDifficulty {
  pub const ALL: [McqDifficulty; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Mixed];

  pub fn label(self) -> &'static str {
    match self {
      Self::Easy => "Dễ",
      Self::Medium => "Trung bình",
      Self::Hard => "Khó",
      Self::Mixed => "Tổng hợp",
    }
  }
}

/// Form input for one generation. Immutable per request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudyConfiguration {
  pub subject: String,
  pub grade: String,
  pub textbook: String,
  #[serde(default)] pub main_topic: String,
  /// Newline-delimited list, usually "- " prefixed.
  #[serde(default)] pub learning_objectives: String,
  #[serde(default)] pub mcq_count: u32,
  #[serde(default)] pub essay_count: u32,
  #[serde(default)] pub mcq_difficulty: McqDifficulty,
}

impl StudyConfiguration {
  /// May be zero; an empty practice test is a valid request.
  pub fn total_questions(&self) -> u32 {
    self.mcq_count.saturating_add(self.essay_count)
  }
}

impl Default for StudyConfiguration {
  fn default() -> Self { crate::seeds::default_study_configuration() }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  Mcq,
  Essay,
}

impl QuestionType {
  pub fn label(self) -> &'static str {
    match self {
      Self::Mcq => "Trắc nghiệm",
      Self::Essay => "Tự luận",
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PracticeQuestion {
  #[serde(rename = "type")]
  pub kind: QuestionType,
  pub question: String,
  /// Only meaningful for multiple-choice questions.
  #[serde(default)]
  pub options: Vec<String>,
  pub answer: String,
  pub explanation: String,
}

impl PracticeQuestion {
  /// Options a reader may pick from. Essays never have any, whatever the model sent.
  pub fn selectable_options(&self) -> &[String] {
    match self.kind {
      QuestionType::Mcq => &self.options,
      QuestionType::Essay => &[],
    }
  }
}

/// Model output: summary sections plus the practice test.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudyPackage {
  pub topic_overview: String,
  /// Items may contain `**emphasis**` markers.
  pub core_concepts: Vec<String>,
  #[serde(default)] pub key_facts: Vec<String>,
  #[serde(default)] pub formulas: Vec<String>,
  pub examples: Vec<String>,
  pub memory_tips: Vec<String>,
  pub study_suggestions: String,
  pub practice_test: Vec<PracticeQuestion>,
}

impl StudyPackage {
  /// (mcq, essay) counts actually present in the practice test.
  pub fn question_split(&self) -> (usize, usize) {
    let mcq = self.practice_test.iter().filter(|q| q.kind == QuestionType::Mcq).count();
    (mcq, self.practice_test.len() - mcq)
  }
}

/// The three independently tracked request kinds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
  Summary,
  TopicSuggestion,
  ObjectivesSuggestion,
}

impl RequestKind {
  /// Fixed sampling temperature: low for structured output, higher for open suggestions.
  pub fn temperature(self) -> f32 {
    match self {
      Self::Summary => 0.5,
      Self::TopicSuggestion => 0.7,
      Self::ObjectivesSuggestion => 0.6,
    }
  }

  pub fn failure_message(self) -> &'static str {
    match self {
      Self::Summary => "Đã xảy ra lỗi khi tạo tóm tắt. Vui lòng thử lại.",
      Self::TopicSuggestion | Self::ObjectivesSuggestion => "Không thể tải gợi ý. Vui lòng thử lại.",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Summary => "summary",
      Self::TopicSuggestion => "topic_suggestion",
      Self::ObjectivesSuggestion => "objectives_suggestion",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn configuration_reads_camel_case_and_difficulty_labels() {
    let cfg: StudyConfiguration = serde_json::from_str(r#"{
      "subject": "Lịch sử", "grade": "Lớp 12", "textbook": "Cánh Diều",
      "mainTopic": "Chiến dịch Hồ Chí Minh", "learningObjectives": "- A\n- B",
      "mcqCount": 2, "essayCount": 1, "mcqDifficulty": "Khó"
    }"#).unwrap();
    assert_eq!(cfg.mcq_difficulty, McqDifficulty::Hard);
    assert_eq!(cfg.total_questions(), 3);
  }

  #[test]
  fn unknown_difficulty_is_rejected() {
    let res = serde_json::from_str::<StudyConfiguration>(
      r#"{"subject":"x","grade":"y","textbook":"z","mcqDifficulty":"Siêu khó"}"#,
    );
    assert!(res.is_err());
  }

  #[test]
  fn negative_counts_are_rejected() {
    let res = serde_json::from_str::<StudyConfiguration>(
      r#"{"subject":"x","grade":"y","textbook":"z","mcqCount":-1}"#,
    );
    assert!(res.is_err());
  }

  #[test]
  fn essay_options_are_never_selectable() {
    let q = PracticeQuestion {
      kind: QuestionType::Essay,
      question: "Phân tích ý nghĩa.".into(),
      options: vec!["A".into(), "B".into()],
      answer: "...".into(),
      explanation: "...".into(),
    };
    assert!(q.selectable_options().is_empty());
  }

  #[test]
  fn temperatures_per_kind() {
    assert_eq!(RequestKind::Summary.temperature(), 0.5);
    assert_eq!(RequestKind::TopicSuggestion.temperature(), 0.7);
    assert_eq!(RequestKind::ObjectivesSuggestion.temperature(), 0.6);
  }
}

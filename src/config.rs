//! Loading study configuration (prompts + form catalog) from TOML.
//!
//! See `StudyConfig`, `Prompts` and `Catalog` for the expected schema. Every
//! section and field is optional; missing ones fall back to the built-in defaults.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::{McqDifficulty, StudyConfiguration};
use crate::seeds;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StudyConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub catalog: Catalog,
}

/// Prompt templates used by the prompt builder. `{placeholder}` values are
/// substituted with `util::fill_template`.
///
/// Summary placeholders: subject, grade, textbook, main_topic, learning_objectives,
/// mcq_count, essay_count, total_questions, mcq_difficulty.
/// Topic placeholders: subject, grade, textbook.
/// Objectives placeholders: subject, grade, textbook, main_topic.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub summary_system: String,
  pub summary_user_template: String,
  /// Appended to the summary prompt when no questions are requested.
  pub empty_practice_test_note: String,
  pub topic_system: String,
  pub topic_user_template: String,
  pub objectives_system: String,
  pub objectives_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      summary_system: "Bạn là chuyên gia biên soạn nội dung giáo dục. Chỉ trả về JSON đúng schema đã định nghĩa.".into(),
      summary_user_template: r#"Bối cảnh:
- Môn học: {subject}
- Lớp: {grade}
- Bộ sách: {textbook}
- Chủ đề chính: {main_topic}
- Cấu trúc bài kiểm tra dự kiến: {mcq_count} câu trắc nghiệm và {essay_count} câu tự luận (tổng cộng {total_questions} câu).
- Độ khó câu trắc nghiệm (MCQ): {mcq_difficulty}
- Mục tiêu học tập cần đạt:
{learning_objectives}

Yêu cầu:
Với vai trò là một chuyên gia biên soạn nội dung giáo dục, hãy tạo một bản tóm tắt ôn tập chi tiết VÀ một bài kiểm tra tham khảo. Nội dung cần bám sát kiến thức từ bộ sách "{textbook}" nếu có thể.

1. **Bản tóm tắt ôn tập**: Phải súc tích, có cấu trúc, chính xác về mặt kiến thức, logic, dễ hiểu và bám sát các mục tiêu học tập đã đề ra. Phần "Gợi ý ôn tập" (studySuggestions) cần đưa ra lời khuyên phù hợp với cấu trúc kiểm tra gồm {mcq_count} câu trắc nghiệm và {essay_count} câu tự luận.
2. **Bài kiểm tra tham khảo (practiceTest)**: Tạo chính xác {mcq_count} câu hỏi trắc nghiệm và {essay_count} câu hỏi tự luận dựa trên chủ đề và mục tiêu học tập. Các câu hỏi trắc nghiệm phải tuân thủ nghiêm ngặt độ khó đã yêu cầu là "{mcq_difficulty}". Mỗi câu hỏi phải có đáp án đúng và phần giải thích chi tiết, rõ ràng để giúp người học củng cố kiến thức.

Hãy đảm bảo toàn bộ nội dung phù hợp với cấp học và bộ sách được cung cấp, và trả về kết quả theo đúng schema JSON đã định nghĩa."#.into(),
      empty_practice_test_note: "Lưu ý: không yêu cầu câu hỏi nào, hãy trả về practiceTest là một mảng rỗng ([]) nhưng vẫn tạo đầy đủ bản tóm tắt.".into(),
      topic_system: "Bạn là trợ lý học tập. Chỉ trả về đúng nội dung được yêu cầu.".into(),
      topic_user_template: r#"Dựa trên thông tin sau:
- Môn học: {subject}
- Lớp: {grade}
- Bộ sách: {textbook}

Hãy gợi ý MỘT chủ đề học tập chính phù hợp.

Yêu cầu quan trọng: Chỉ trả về TÊN CHỦ ĐỀ, không thêm bất kỳ lời giải thích, định dạng, hay ký tự đặc biệt nào (ví dụ: không có dấu ngoặc kép, dấu gạch đầu dòng, hay chữ in đậm **)."#.into(),
      objectives_system: "Bạn là trợ lý học tập. Chỉ trả về đúng nội dung được yêu cầu.".into(),
      objectives_user_template: r#"Dựa trên thông tin sau:
- Môn học: {subject}
- Lớp: {grade}
- Bộ sách: {textbook}
- Chủ đề chính: "{main_topic}"

Hãy gợi ý 3-4 mục tiêu học tập cốt lõi mà một học sinh cần đạt được cho chủ đề này.

Yêu cầu quan trọng:
- Trả về kết quả dưới dạng danh sách.
- Mỗi mục tiêu bắt đầu bằng một dấu gạch ngang và một khoảng trắng ("- ").
- Không thêm bất kỳ lời giải thích, tiêu đề, hay định dạng nào khác.

Ví dụ:
- Nắm vững bối cảnh, diễn biến chính và kết quả.
- Phân tích được ý nghĩa lịch sử."#.into(),
    }
  }
}

/// Option lists offered by the form, plus the initial form values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
  pub subjects: Vec<String>,
  pub grades: Vec<String>,
  pub textbooks: Vec<String>,
  #[serde(skip_deserializing)]
  pub difficulties: Vec<McqDifficulty>,
  pub defaults: StudyConfiguration,
}

impl Default for Catalog {
  fn default() -> Self {
    Self {
      subjects: seeds::default_subjects(),
      grades: seeds::default_grades(),
      textbooks: seeds::default_textbooks(),
      difficulties: McqDifficulty::ALL.to_vec(),
      defaults: seeds::default_study_configuration(),
    }
  }
}

/// Attempt to load `StudyConfig` from STUDY_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_study_config_from_env() -> Option<StudyConfig> {
  let path = std::env::var("STUDY_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_study_config(&s) {
      Ok(cfg) => {
        info!(target: "ontap_backend", %path, "Loaded study config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "ontap_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "ontap_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_study_config(s: &str) -> Result<StudyConfig, toml::de::Error> {
  toml::from_str::<StudyConfig>(s)
}

//! Built-in default content: the option lists offered by the form and the initial
//! form values, so the service is usable without any external config.

use crate::domain::{McqDifficulty, StudyConfiguration};

pub fn default_subjects() -> Vec<String> {
  [
    "Lịch sử",
    "Địa lý",
    "Ngữ văn",
    "Toán học",
    "Vật lý",
    "Hóa học",
    "Sinh học",
    "Giáo dục công dân",
    "Tiếng Anh",
  ]
  .into_iter()
  .map(String::from)
  .collect()
}

pub fn default_grades() -> Vec<String> {
  let mut grades: Vec<String> = (1..=12).map(|n| format!("Lớp {n}")).collect();
  grades.push("Đại học/Cao đẳng".into());
  grades
}

pub fn default_textbooks() -> Vec<String> {
  [
    "Kết nối tri thức với cuộc sống",
    "Chân trời sáng tạo",
    "Cánh Diều",
    "Cùng học để phát triển năng lực",
    "Bộ sách khác",
  ]
  .into_iter()
  .map(String::from)
  .collect()
}

/// Initial form state for a new session.
pub fn default_study_configuration() -> StudyConfiguration {
  StudyConfiguration {
    subject: "Lịch sử".into(),
    grade: "Lớp 12".into(),
    textbook: "Cánh Diều".into(),
    main_topic: "Chiến dịch Hồ Chí Minh lịch sử".into(),
    learning_objectives: "- Nắm vững bối cảnh, diễn biến chính và kết quả của chiến dịch.\n- Phân tích được ý nghĩa lịch sử của chiến dịch.".into(),
    mcq_count: 16,
    essay_count: 4,
    mcq_difficulty: McqDifficulty::Medium,
  }
}

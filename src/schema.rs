//! Declared output schema for the study package and validation of model payloads
//! against it.
//!
//! The descriptor below is what the model is told to produce; `parse_study_package`
//! is what we actually trust. Required fields have no serde default, so a missing
//! field is a `MalformedOutput`, never a silently filled value.

use serde_json::{json, Value};

use crate::domain::{QuestionType, StudyPackage};
use crate::error::StudyError;

/// Name under which the schema is declared to the model.
pub const STUDY_PACKAGE_SCHEMA_NAME: &str = "study_package";

pub const REQUIRED_PACKAGE_FIELDS: [&str; 6] = [
  "topicOverview",
  "coreConcepts",
  "examples",
  "memoryTips",
  "studySuggestions",
  "practiceTest",
];

fn string_list(description: &str) -> Value {
  json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

fn practice_question_schema() -> Value {
  json!({
    "type": "object",
    "properties": {
      "type": {
        "type": "string",
        "enum": ["mcq", "essay"],
        "description": "Loại câu hỏi: \"mcq\" cho trắc nghiệm hoặc \"essay\" cho tự luận."
      },
      "question": { "type": "string", "description": "Nội dung của câu hỏi." },
      "options": string_list("Danh sách các lựa chọn trả lời cho câu hỏi trắc nghiệm. Trả về mảng rỗng nếu là câu tự luận."),
      "answer": {
        "type": "string",
        "description": "Đáp án đúng. Đối với trắc nghiệm, đây là nội dung của lựa chọn đúng. Đối với tự luận, đây là câu trả lời mẫu."
      },
      "explanation": {
        "type": "string",
        "description": "Giải thích chi tiết và rõ ràng cho đáp án, giúp người học hiểu sâu hơn về kiến thức liên quan."
      }
    },
    "required": ["type", "question", "answer", "explanation"]
  })
}

/// JSON-schema descriptor of `StudyPackage`.
pub fn study_package_schema() -> Value {
  json!({
    "type": "object",
    "properties": {
      "topicOverview": {
        "type": "string",
        "description": "Một đoạn văn ngắn (2-3 câu) tổng quan về chủ đề, nêu bật phạm vi và trọng tâm ôn tập chính."
      },
      "coreConcepts": string_list("Danh sách các khái niệm, định nghĩa hoặc lý thuyết cốt lõi, trình bày dưới dạng gạch đầu dòng. In đậm (sử dụng markdown **text**) các thuật ngữ quan trọng."),
      "keyFacts": string_list("Danh sách các dữ kiện, con số, hoặc mốc thời gian quan trọng (nếu có). Trả về mảng rỗng nếu không áp dụng."),
      "formulas": string_list("Danh sách các công thức, phương trình hoặc quy trình chính (nếu có). Trả về mảng rỗng nếu không áp dụng."),
      "examples": string_list("Một vài ví dụ minh họa ngắn gọn, dễ hiểu để làm rõ các khái niệm hoặc công thức."),
      "memoryTips": string_list("Danh sách các mẹo ghi nhớ, câu thần chú, hoặc chỉ ra các lỗi sai phổ biến mà học sinh thường mắc phải."),
      "studySuggestions": {
        "type": "string",
        "description": "Một đoạn văn ngắn đưa ra gợi ý về cách ôn tập hiệu quả dựa trên cấu trúc kiểm tra đã cho (số lượng câu Trắc nghiệm và Tự luận)."
      },
      "practiceTest": {
        "type": "array",
        "items": practice_question_schema(),
        "description": "Một bài kiểm tra tham khảo bao gồm các câu hỏi trắc nghiệm và tự luận. Mỗi câu hỏi phải có đáp án và giải thích chi tiết."
      }
    },
    "required": REQUIRED_PACKAGE_FIELDS
  })
}

/// Remove one surrounding Markdown code fence (``` or ```json), if the whole payload is fenced.
fn strip_code_fence(text: &str) -> &str {
  let t = text.trim();
  let Some(rest) = t.strip_prefix("```") else { return t };
  let Some(body) = rest.strip_suffix("```") else { return t };
  let body = body.trim_start();
  if body.starts_with('{') || body.starts_with('[') {
    return body.trim();
  }
  // Skip the info string ("json"), on its own line or followed by a space.
  body.split_once(char::is_whitespace).map(|(_, rest)| rest.trim()).unwrap_or("")
}

/// Validate a model payload against the study package shape.
pub fn parse_study_package(text: &str) -> Result<StudyPackage, StudyError> {
  let payload = strip_code_fence(text);
  if payload.is_empty() {
    return Err(StudyError::malformed("empty payload"));
  }
  let package = serde_json::from_str::<StudyPackage>(payload)
    .map_err(|e| StudyError::malformed(format!("JSON parse error: {e}")))?;
  check_choices(&package)?;
  Ok(package)
}

/// Multiple-choice questions must offer something to choose from.
fn check_choices(package: &StudyPackage) -> Result<(), StudyError> {
  match package
    .practice_test
    .iter()
    .position(|q| q.kind == QuestionType::Mcq && q.options.is_empty())
  {
    Some(i) => Err(StudyError::malformed(format!("practiceTest[{i}]: mcq question without options"))),
    None => Ok(()),
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  /// Package with two MCQs and one essay, as the model would return it.
  pub(crate) fn sample_package_json() -> Value {
    json!({
      "topicOverview": "Chiến dịch Hồ Chí Minh (26/4 - 30/4/1975) là chiến dịch quyết định.",
      "coreConcepts": ["**Tổng tiến công và nổi dậy** mùa Xuân 1975", "Thời cơ chiến lược"],
      "keyFacts": ["30/4/1975: giải phóng Sài Gòn"],
      "examples": ["Quân ta tiến vào Dinh Độc Lập."],
      "memoryTips": ["Nhớ mốc 30/4."],
      "studySuggestions": "Ôn kỹ mốc thời gian cho 2 câu trắc nghiệm và dàn ý cho 1 câu tự luận.",
      "practiceTest": [
        { "type": "mcq", "question": "Chiến dịch bắt đầu ngày nào?", "options": ["26/4/1975", "30/4/1975"], "answer": "26/4/1975", "explanation": "Nổ súng ngày 26/4." },
        { "type": "mcq", "question": "Chiến dịch kết thúc ngày nào?", "options": ["29/4/1975", "30/4/1975"], "answer": "30/4/1975", "explanation": "Sài Gòn giải phóng 30/4." },
        { "type": "essay", "question": "Phân tích ý nghĩa lịch sử của chiến dịch.", "answer": "Kết thúc chiến tranh...", "explanation": "Nêu ý nghĩa dân tộc và quốc tế." }
      ]
    })
  }

  #[test]
  fn declares_the_mandatory_fields() {
    let schema = study_package_schema();
    let required: Vec<&str> = schema["required"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(required, REQUIRED_PACKAGE_FIELDS);
    assert!(!required.contains(&"keyFacts"));
    assert!(!required.contains(&"formulas"));
    assert_eq!(schema["properties"]["practiceTest"]["items"]["properties"]["type"]["enum"], json!(["mcq", "essay"]));
  }

  #[test]
  fn parses_a_complete_package() {
    let pkg = parse_study_package(&sample_package_json().to_string()).unwrap();
    assert_eq!(pkg.practice_test.len(), 3);
    assert_eq!(pkg.question_split(), (2, 1));
    assert!(pkg.formulas.is_empty());
    assert_eq!(pkg.practice_test[2].kind, QuestionType::Essay);
    assert!(pkg.practice_test[2].options.is_empty());
  }

  #[test]
  fn missing_study_suggestions_is_malformed() {
    let mut v = sample_package_json();
    v.as_object_mut().unwrap().remove("studySuggestions");
    let err = parse_study_package(&v.to_string()).unwrap_err();
    assert!(matches!(err, StudyError::MalformedOutput { .. }));
    assert!(err.to_string().contains("studySuggestions"));
  }

  #[test]
  fn unknown_question_type_is_malformed() {
    let mut v = sample_package_json();
    v["practiceTest"][0]["type"] = json!("true_false");
    assert!(matches!(parse_study_package(&v.to_string()), Err(StudyError::MalformedOutput { .. })));
  }

  #[test]
  fn non_json_is_malformed() {
    assert!(matches!(parse_study_package("Xin lỗi, tôi không thể."), Err(StudyError::MalformedOutput { .. })));
    assert!(matches!(parse_study_package("   "), Err(StudyError::MalformedOutput { .. })));
  }

  #[test]
  fn fenced_payload_is_accepted() {
    let fenced = format!("```json\n{}\n```", sample_package_json());
    assert_eq!(parse_study_package(&fenced).unwrap().practice_test.len(), 3);
  }

  #[test]
  fn single_line_fence_is_accepted() {
    let compact = sample_package_json().to_string();
    for fenced in [format!("```json {compact}```"), format!("```{compact}```"), format!("``` {compact} ```")] {
      assert_eq!(parse_study_package(&fenced).unwrap().practice_test.len(), 3, "rejected {fenced:.20}");
    }
  }

  #[test]
  fn mcq_without_options_is_malformed() {
    let mut v = sample_package_json();
    v["practiceTest"][0].as_object_mut().unwrap().remove("options");
    let err = parse_study_package(&v.to_string()).unwrap_err();
    assert!(matches!(err, StudyError::MalformedOutput { .. }));
    assert!(err.to_string().contains("practiceTest[0]"));
  }

  #[test]
  fn mcq_with_empty_options_is_malformed() {
    let mut v = sample_package_json();
    v["practiceTest"][1]["options"] = json!([]);
    let err = parse_study_package(&v.to_string()).unwrap_err();
    assert!(matches!(err, StudyError::MalformedOutput { .. }));
    assert!(err.to_string().contains("practiceTest[1]"));
  }
}

//! Plain-text rendering of a study package for copy/export.
//!
//! Optional sections are skipped when empty, and essay questions never list options.

use crate::domain::StudyPackage;
use crate::util::truncate_chars;

const APP_TITLE: &str = "Trợ lý ôn tập AI";
const TOPIC_MAX_CHARS: usize = 50;

fn push_list(out: &mut String, title: &str, items: &[String]) {
  out.push_str(title);
  out.push('\n');
  let body = items.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n");
  out.push_str(&body);
  out.push_str("\n\n");
}

/// Section-by-section text, as copied to the clipboard.
pub fn format_plain_text(pkg: &StudyPackage) -> String {
  let mut out = String::new();
  out.push_str(&format!("TỔNG QUAN CHỦ ĐỀ\n{}\n\n", pkg.topic_overview));
  push_list(&mut out, "KHÁI NIỆM & LÝ THUYẾT CỐT LÕI", &pkg.core_concepts);
  if !pkg.key_facts.is_empty() {
    push_list(&mut out, "DỮ KIỆN/CON SỐ/NIÊN BIỂU", &pkg.key_facts);
  }
  if !pkg.formulas.is_empty() {
    push_list(&mut out, "CÔNG THỨC/QUY TRÌNH", &pkg.formulas);
  }
  push_list(&mut out, "VÍ DỤ MINH HỌA", &pkg.examples);
  push_list(&mut out, "MẸO GHI NHỚ & LỖI DỄ NHẦM", &pkg.memory_tips);
  out.push_str(&format!("GỢI Ý ÔN TẬP\n{}\n\n", pkg.study_suggestions));

  if !pkg.practice_test.is_empty() {
    out.push_str("BÀI KIỂM TRA THAM KHẢO\n\n");
    for (i, q) in pkg.practice_test.iter().enumerate() {
      out.push_str(&format!("Câu {} ({}): {}\n", i + 1, q.kind.label(), q.question));
      for opt in q.selectable_options() {
        out.push_str(&format!("- {opt}\n"));
      }
      out.push_str(&format!("Đáp án: {}\nGiải thích: {}\n\n", q.answer, q.explanation));
    }
  }
  out
}

/// Export document: a title/topic header followed by `format_plain_text`.
pub fn format_export_document(main_topic: &str, pkg: &StudyPackage) -> String {
  let topic = match main_topic.trim() {
    "" => "Tóm tắt ôn tập",
    t => t,
  };
  format!(
    "{APP_TITLE}\nChủ đề: {}\n\n{}",
    truncate_chars(topic, TOPIC_MAX_CHARS),
    format_plain_text(pkg)
  )
}

/// `tom-tat-<slug>.txt`: lowercase, anything outside [a-z0-9] becomes '-', at most 30 chars.
pub fn export_file_name(main_topic: &str) -> String {
  let slug: String = main_topic
    .to_lowercase()
    .chars()
    .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
    .take(30)
    .collect();
  let slug = if slug.is_empty() { "on-tap".to_string() } else { slug };
  format!("tom-tat-{slug}.txt")
}

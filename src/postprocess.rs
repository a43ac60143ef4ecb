//! Cleanup of free-text suggestions. Models add quotes, list markers and bold
//! markers even when told not to.

/// Strip one surrounding `"` pair, then one leading `"- "`, then one surrounding
/// `**` pair, trimming after each step. Repeats until stable, so
/// `clean_suggestion(clean_suggestion(s)) == clean_suggestion(s)` for every `s`.
pub fn clean_suggestion(raw: &str) -> String {
  let mut current = raw.trim();
  loop {
    let next = strip_bold(strip_list_marker(strip_quotes(current)));
    if next == current {
      return next.to_string();
    }
    current = next;
  }
}

fn strip_quotes(s: &str) -> &str {
  strip_pair(s, "\"")
}

fn strip_list_marker(s: &str) -> &str {
  s.strip_prefix("- ").map(str::trim).unwrap_or(s)
}

fn strip_bold(s: &str) -> &str {
  strip_pair(s, "**")
}

fn strip_pair<'a>(s: &'a str, marker: &str) -> &'a str {
  s.strip_prefix(marker)
    .and_then(|rest| rest.strip_suffix(marker))
    .map(str::trim)
    .unwrap_or(s)
}

/// Objectives come back as a "- " list: keep the markers, trim each line, drop blank lines.
pub fn clean_objectives(raw: &str) -> String {
  raw
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_each_artifact() {
    assert_eq!(clean_suggestion("**Quang hợp**"), "Quang hợp");
    assert_eq!(clean_suggestion("- Nắm vững nội dung."), "Nắm vững nội dung.");
    assert_eq!(clean_suggestion("\"Chủ đề X\""), "Chủ đề X");
  }

  #[test]
  fn quoted_bold_topic_is_fully_cleaned() {
    assert_eq!(clean_suggestion("  \"**Quang hợp ở thực vật**\"\n"), "Quang hợp ở thực vật");
    assert_eq!(clean_suggestion("- **Cách mạng tháng Tám**"), "Cách mạng tháng Tám");
  }

  #[test]
  fn partial_wrappers_are_kept() {
    assert_eq!(clean_suggestion("\"Chủ đề"), "\"Chủ đề");
    assert_eq!(clean_suggestion("**Chủ đề"), "**Chủ đề");
    assert_eq!(clean_suggestion("-Chủ đề"), "-Chủ đề");
    assert_eq!(clean_suggestion("\""), "\"");
    assert_eq!(clean_suggestion("***"), "***");
  }

  #[test]
  fn idempotent_on_awkward_inputs() {
    let inputs = [
      "",
      "   ",
      "plain",
      "\"\"nested\"\"",
      "\"- \"x\"\"",
      "**- a**",
      "- - - x",
      "\"**\"",
      "****",
      "\"- **\"",
      "Chủ đề \"trong\" ngoặc",
    ];
    for s in inputs {
      let once = clean_suggestion(s);
      assert_eq!(clean_suggestion(&once), once, "not idempotent for {s:?}");
    }
  }

  #[test]
  fn objectives_keep_markers() {
    let raw = "\n- Nắm vững bối cảnh.  \n\n  - Phân tích ý nghĩa.\n";
    assert_eq!(clean_objectives(raw), "- Nắm vững bối cảnh.\n- Phân tích ý nghĩa.");
  }
}

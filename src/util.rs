//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe preview of model text: first `max` chars, with the total length appended.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  let total = s.chars().count();
  if total <= max {
    s.to_string()
  } else {
    format!("{}… ({} chars total)", s.chars().take(max).collect::<String>(), total)
  }
}

/// Truncate on char boundaries, appending "..." when cut. `max` includes the ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    return s.to_string();
  }
  let keep = max.saturating_sub(3);
  format!("{}...", s.chars().take(keep).collect::<String>())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fills_every_occurrence() {
    assert_eq!(fill_template("{a}-{b}-{a}", &[("a", "1"), ("b", "2")]), "1-2-1");
  }

  #[test]
  fn unknown_placeholders_are_left_alone() {
    assert_eq!(fill_template("{a} {zzz}", &[("a", "x")]), "x {zzz}");
  }

  #[test]
  fn truncation_respects_multibyte_chars() {
    let s = "Chiến dịch Hồ Chí Minh";
    assert_eq!(truncate_chars(s, 100), s);
    assert_eq!(truncate_chars(s, 9), "Chiến ...");
    assert!(trunc_for_log(s, 5).starts_with("Chiến…"));
  }
}

//! Shared field rules used by the entity validators.

use crate::Violation;

/// Null check then empty check, in the manner of a not-null + not-empty
/// column rule. Pushes at most one violation and returns the value when it
/// passes.
pub fn required_text(
    violations: &mut Vec<Violation>,
    field: &'static str,
    value: Option<String>,
    missing: &str,
    empty: &str,
) -> Option<String> {
    match value {
        None => {
            violations.push(Violation::new(field, missing));
            None
        }
        Some(v) if v.trim().is_empty() => {
            violations.push(Violation::new(field, empty));
            None
        }
        Some(v) => Some(v),
    }
}

/// Empty-check for a field that may be omitted (partial updates).
pub fn non_empty_if_present(
    violations: &mut Vec<Violation>,
    field: &'static str,
    value: Option<&str>,
    empty: &str,
) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        violations.push(Violation::new(field, empty));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_distinguishes_missing_from_empty() {
        let mut v = Vec::new();
        assert_eq!(required_text(&mut v, "title", None, "missing", "empty"), None);
        assert_eq!(
            required_text(&mut v, "title", Some(" ".to_string()), "missing", "empty"),
            None
        );
        assert_eq!(
            required_text(&mut v, "title", Some("x".to_string()), "missing", "empty"),
            Some("x".to_string())
        );
        let messages: Vec<_> = v.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["missing", "empty"]);
    }

    #[test]
    fn absent_optional_fields_pass() {
        let mut v = Vec::new();
        non_empty_if_present(&mut v, "title", None, "empty");
        non_empty_if_present(&mut v, "title", Some("ok"), "empty");
        assert!(v.is_empty());
        non_empty_if_present(&mut v, "title", Some(""), "empty");
        assert_eq!(v.len(), 1);
    }
}

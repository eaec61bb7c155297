//! Fixed-position windows over coded values.
//!
//! Leader and control-field values encode several codes at fixed character
//! positions. A [`ControlledValueRule`] names one window:
//!
//! | `start` | `end`    | window                       |
//! |---------|----------|------------------------------|
//! | `None`  | any      | the whole value              |
//! | `Some(s)` | `None` | one character at `s`         |
//! | `Some(s)` | `Some(e)` | characters `s..=e`       |
//!
//! Offsets count characters, not bytes. Extraction never fails: a value
//! shorter than the window yields whatever part of the window it covers.
//!
//! # Examples
//!
//! ```
//! use marc_audit::positional::{describe_window, extract};
//! use marc_audit::ControlledValueRule;
//!
//! let rule = ControlledValueRule::new("000", '@', Some(6), Some(7));
//! assert_eq!(extract("00714cam a2200205 a 4500", &rule), "am");
//! assert_eq!(describe_window(&rule), "position: 6-7");
//! ```

use crate::schema::definitions::ControlledValueRule;

/// Extract the window a rule designates from a value.
#[must_use]
pub fn extract(value: &str, rule: &ControlledValueRule) -> String {
    let Some(start) = rule.start else {
        return value.to_string();
    };
    let len = match rule.end {
        None => 1,
        Some(end) if end >= start => end - start + 1,
        Some(_) => 0,
    };
    value.chars().skip(start).take(len).collect()
}

/// Human-readable window label for finding contexts.
///
/// `position: N` for a one-character window, `position: N-M` for a wider one,
/// and an empty string when the rule covers the whole value.
#[must_use]
pub fn describe_window(rule: &ControlledValueRule) -> String {
    match (rule.start, rule.end) {
        (None, _) => String::new(),
        (Some(start), None) => format!("position: {start}"),
        (Some(start), Some(end)) if end <= start => format!("position: {start}"),
        (Some(start), Some(end)) => format!("position: {start}-{end}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEADER: &str = "00714cam a2200205 a 4500";

    fn rule(start: Option<usize>, end: Option<usize>) -> ControlledValueRule {
        ControlledValueRule::new("000", '@', start, end)
    }

    #[test]
    fn test_single_position() {
        assert_eq!(extract(LEADER, &rule(Some(6), None)), "a");
        assert_eq!(extract(LEADER, &rule(Some(0), None)), "0");
        assert_eq!(describe_window(&rule(Some(6), None)), "position: 6");
        assert_eq!(describe_window(&rule(Some(0), None)), "position: 0");
    }

    #[test]
    fn test_inclusive_range() {
        assert_eq!(extract(LEADER, &rule(Some(5), Some(7))), "cam");
        assert_eq!(extract(LEADER, &rule(Some(6), Some(6))), "a");
        assert_eq!(describe_window(&rule(Some(5), Some(7))), "position: 5-7");
        assert_eq!(describe_window(&rule(Some(6), Some(6))), "position: 6");
    }

    #[test]
    fn test_whole_value() {
        assert_eq!(extract("fre", &rule(None, None)), "fre");
        assert_eq!(extract("fre", &rule(None, Some(1))), "fre");
        assert_eq!(describe_window(&rule(None, None)), "");
    }

    #[test]
    fn test_short_values_are_permissive() {
        assert_eq!(extract("abc", &rule(Some(1), Some(10))), "bc");
        assert_eq!(extract("abc", &rule(Some(5), None)), "");
        assert_eq!(extract("", &rule(Some(0), Some(3))), "");
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert_eq!(extract(LEADER, &rule(Some(7), Some(5))), "");
    }

    #[test]
    fn test_offsets_count_characters() {
        assert_eq!(extract("éàü", &rule(Some(1), None)), "à");
        assert_eq!(extract("xéàüy", &rule(Some(1), Some(3))), "éàü");
    }
}

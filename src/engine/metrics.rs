use crate::engine::diff::count_changed_characters;

/// Live metrics for one attempt, recomputed after every tick and edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    pub speed_ccpm: u32,
    pub completion_percent: u8,
}

impl Metrics {
    pub fn compute(current: &str, original: &str, modified: &str, elapsed_secs: f64) -> Self {
        Self {
            speed_ccpm: speed_ccpm(current, original, elapsed_secs),
            completion_percent: completion_percent(current, original, modified),
        }
    }
}

/// Characters changed per minute, measured against the original text.
pub fn speed_ccpm(current: &str, original: &str, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 || !elapsed_secs.is_finite() {
        return 0;
    }
    let changed = count_changed_characters(current, original) as f64;
    let rate = (changed / (elapsed_secs / 60.0)).round();
    if rate.is_finite() && rate >= 0.0 {
        rate.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// How far `current` has travelled from `original` toward `modified`, in
/// whole percent. Floors at 0 when the user has moved further away than the
/// original was; a problem with no required changes is always 100.
pub fn completion_percent(current: &str, original: &str, modified: &str) -> u8 {
    let total = count_changed_characters(original, modified);
    if total == 0 {
        return 100;
    }
    let remaining = count_changed_characters(current, modified);
    let missing = (remaining as f64 / total as f64 * 100.0).round() as i64;
    (100 - missing).clamp(0, 100) as u8
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Completion predicate: equal once every whitespace run is collapsed to a
/// single space and both ends are trimmed.
pub fn is_normalized_equal(a: &str, b: &str) -> bool {
    a.split_whitespace().eq(b.split_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_zero_elapsed_is_zero() {
        assert_eq!(speed_ccpm("abc", "xyz", 0.0), 0);
        assert_eq!(speed_ccpm("", "", 0.0), 0);
    }

    #[test]
    fn test_speed_negative_or_nan_elapsed_is_zero() {
        assert_eq!(speed_ccpm("abc", "xyz", -1.0), 0);
        assert_eq!(speed_ccpm("abc", "xyz", f64::NAN), 0);
    }

    #[test]
    fn test_speed_no_changes_is_zero() {
        assert_eq!(speed_ccpm("same", "same", 12.0), 0);
    }

    #[test]
    fn test_speed_scales_to_per_minute() {
        // "12" vs "1": one inserted char in 30s -> 2 per minute.
        assert_eq!(speed_ccpm("12", "1", 30.0), 2);
        // 6 changed chars in 4s -> 90 per minute.
        assert_eq!(speed_ccpm("let total=1;", "let x=1;", 4.0), 90);
    }

    #[test]
    fn test_speed_rounds_to_nearest() {
        // 1 char in 7s -> 8.57 per minute.
        assert_eq!(speed_ccpm("12", "1", 7.0), 9);
    }

    #[test]
    fn test_completion_untouched_is_zero() {
        assert_eq!(completion_percent("let x=1;", "let x=1;", "let total=1;"), 0);
    }

    #[test]
    fn test_completion_reached_target_is_100() {
        assert_eq!(completion_percent("let total=1;", "let x=1;", "let total=1;"), 100);
    }

    #[test]
    fn test_completion_no_required_changes_is_100() {
        assert_eq!(completion_percent("same", "same", "same"), 100);
        assert_eq!(completion_percent("different", "same", "same"), 100);
    }

    #[test]
    fn test_completion_partial_progress() {
        // original "1" -> target "12": 1 change. Halfway impossible, so use a
        // longer target: "3" -> "355" needs 2 inserts, "35" has 1 left.
        assert_eq!(completion_percent("35", "3", "355"), 50);
    }

    #[test]
    fn test_completion_floors_at_zero_when_diverging() {
        let pct = completion_percent("completely unrelated text", "1", "2");
        assert_eq!(pct, 0);
    }

    #[test]
    fn test_completion_always_in_range() {
        let cases = [
            ("", "abc", "abd"),
            ("zzzzzzzzzzzz", "a", "b"),
            ("abd", "abc", "abd"),
            ("ab", "abc", "abd"),
            ("\n\n\t", "x", "xy"),
        ];
        for (current, original, modified) in cases {
            let pct = completion_percent(current, original, modified);
            assert!(pct <= 100, "{pct} out of range for {current:?}");
        }
    }

    #[test]
    fn test_normalized_equality() {
        assert!(is_normalized_equal("a  b\n", "a b"));
        assert!(is_normalized_equal("  fn x() {\n\treturn;\n}", "fn x() { return; }"));
        assert!(!is_normalized_equal("ab", "a b"));
        assert!(is_normalized_equal("", "   \n"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t\n b  "), "a b");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_metrics_compute_fresh_attempt() {
        let m = Metrics::compute("let x=1;", "let x=1;", "let total=1;", 0.0);
        assert_eq!(m.speed_ccpm, 0);
        assert_eq!(m.completion_percent, 0);
    }
}

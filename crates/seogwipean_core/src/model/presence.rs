//! Presence rules shared by create validation and partial updates.
//!
//! A view model field counts as present when:
//! - string: `Some` and non-blank after trimming,
//! - number: `Some` and strictly positive,
//! - date: `Some` and later than [`DATE_SENTINEL_YEAR`],
//! - phone: `Some` and holding at least one digit.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\D+").expect("valid digit regex"));

/// Dates in or before this year are treated as "unset" placeholders.
pub const DATE_SENTINEL_YEAR: i32 = 1;

/// Returns the trimmed text when it is non-blank.
pub fn present_text(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

pub fn present_count(value: Option<i32>) -> Option<i32> {
    value.filter(|count| *count > 0)
}

pub fn present_date(value: Option<NaiveDate>) -> Option<NaiveDate> {
    value.filter(|date| date.year() > DATE_SENTINEL_YEAR)
}

/// Returns the digits of a phone number, or `None` when there are none.
pub fn present_phone(value: &Option<String>) -> Option<String> {
    present_text(value)
        .map(normalize_phone)
        .filter(|digits| !digits.is_empty())
}

/// Strips every non-digit character (`010-1234 5678` -> `01012345678`).
pub fn normalize_phone(value: &str) -> String {
    NON_DIGIT_RE.replace_all(value, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{normalize_phone, present_count, present_date, present_phone, present_text};
    use chrono::NaiveDate;

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(present_text(&None), None);
        assert_eq!(present_text(&Some(String::new())), None);
        assert_eq!(present_text(&Some("  \t".to_string())), None);
        assert_eq!(present_text(&Some(" Kim ".to_string())), Some("Kim"));
    }

    #[test]
    fn non_positive_counts_are_absent() {
        assert_eq!(present_count(Some(0)), None);
        assert_eq!(present_count(Some(-3)), None);
        assert_eq!(present_count(Some(2)), Some(2));
    }

    #[test]
    fn sentinel_year_dates_are_absent() {
        let sentinel = NaiveDate::from_ymd_opt(1, 1, 1);
        assert_eq!(present_date(sentinel), None);
        let real = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(present_date(real), real);
    }

    #[test]
    fn normalize_phone_keeps_digits_only() {
        assert_eq!(normalize_phone("010-1234 5678"), "01012345678");
        assert_eq!(normalize_phone("(010).1234.5678"), "01012345678");
    }

    #[test]
    fn phone_without_digits_is_absent() {
        assert_eq!(present_phone(&Some("--".to_string())), None);
        assert_eq!(
            present_phone(&Some(" 010-2222-3333 ".to_string())).as_deref(),
            Some("01022223333")
        );
    }
}

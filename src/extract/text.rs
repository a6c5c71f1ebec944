// src/extract/text.rs

//! Permissive text normalization for scraped fields.
//!
//! All functions are pure and never fail: a value that cannot be parsed
//! comes back as `None` (or zero for counters), not as an error.

use chrono::NaiveDate;
use regex::Regex;

/// Date-shaped patterns tried in priority order, each with its candidate
/// format strings. Order matters for ambiguous strings: day/month is
/// preferred over month/day.
pub const DATE_PATTERNS: &[(&str, &[&str])] = &[
    (
        r"\d{1,2}[/\-.]\d{1,2}[/\-.]\d{4}",
        &["%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%m-%d-%Y", "%d.%m.%Y"],
    ),
    (r"\d{4}-\d{1,2}-\d{1,2}", &["%Y-%m-%d"]),
    (
        r"(?i)\d{1,2}\s+(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{4}",
        &["%d %b %Y", "%d %B %Y"],
    ),
    (
        r"(?i)(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{4}",
        &["%b %d, %Y", "%b %d %Y", "%B %d, %Y", "%B %d %Y"],
    ),
];

/// Collapse whitespace runs to single spaces and trim the ends.
///
/// Literal escaped `\n` / `\t` sequences (as they appear in sloppy markup)
/// are treated as whitespace. Empty input yields an empty string.
pub fn clean_text(raw: &str) -> String {
    raw.replace("\\n", " ")
        .replace("\\t", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract an integer by concatenating every digit character.
///
/// Returns `None` when the input contains no digits or the concatenation
/// overflows. Deliberately ignores sign, decimal points and grouping, so it
/// must only be applied to text already scoped to the target field.
pub fn parse_number(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Extract a points total from free text.
///
/// Takes the first decimal-like substring, parses it as a float and
/// truncates. Points are a cumulative counter, so "not found" is 0, never
/// unknown.
pub fn parse_points(raw: &str) -> i64 {
    let Some(re) = Regex::new(r"\d+(?:\.\d+)?").ok() else {
        return 0;
    };
    re.find(raw.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|f| f.trunc() as i64)
        .unwrap_or(0)
}

/// Locate and parse the first date-shaped substring.
///
/// Patterns and their candidate formats are tried strictly in the order
/// given; the first format that parses wins.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_date_with(raw, DATE_PATTERNS)
}

/// [`parse_date`] against a caller-supplied priority list.
pub fn parse_date_with(raw: &str, patterns: &[(&str, &[&str])]) -> Option<NaiveDate> {
    let text = clean_text(raw);
    for (pattern, formats) in patterns {
        let Some(re) = Regex::new(pattern).ok() else {
            continue;
        };
        if let Some(m) = re.find(&text) {
            for format in *formats {
                if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), format) {
                    return Some(date);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Max \t  Driver \n"), "Max Driver");
        assert_eq!(clean_text("a\\nb\\tc"), "a b c");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn clean_text_never_leaves_double_spaces() {
        for input in ["a  b", " a \\n b ", "\\t\\t", "x   \\n   y"] {
            let out = clean_text(input);
            assert!(!out.contains("  "), "double space in {out:?}");
            assert_eq!(out, out.trim());
        }
    }

    #[test]
    fn parse_number_concatenates_digits() {
        assert_eq!(parse_number("#44"), Some(44));
        assert_eq!(parse_number("Wins: 103"), Some(103));
        // Digit concatenation, not numeric extraction
        assert_eq!(parse_number("1:23.456"), Some(123456));
    }

    #[test]
    fn parse_number_without_digits_is_absent() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("DNF"), None);
        assert_eq!(parse_number("---"), None);
    }

    #[test]
    fn parse_points_truncates_decimals() {
        assert_eq!(parse_points("25.5 pts"), 25);
        assert_eq!(parse_points("  18"), 18);
    }

    #[test]
    fn parse_points_defaults_to_zero() {
        assert_eq!(parse_points(""), 0);
        assert_eq!(parse_points("no score"), 0);
    }

    #[test]
    fn parse_points_is_non_negative() {
        for input in ["-5", "0", "abc", "3.9", "1000 points"] {
            assert!(parse_points(input) >= 0);
        }
    }

    #[test]
    fn parse_date_prefers_day_month_order() {
        // Ambiguous: 03/04 must resolve as 3 April, not 4 March
        let date = parse_date("Born 03/04/1990").unwrap();
        assert_eq!((date.format("%Y-%m-%d").to_string()), "1990-04-03");
    }

    #[test]
    fn parse_date_handles_month_names() {
        let date = parse_date("Race day: 24 May 2024").unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-05-24");

        let date = parse_date("May 24, 2024").unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-05-24");
    }

    #[test]
    fn parse_date_iso_format() {
        let date = parse_date("updated 2024-03-05 about").unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-03-05");
    }

    #[test]
    fn parse_date_absent_for_garbage() {
        assert_eq!(parse_date("no date here"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("99/99/9999"), None);
    }
}

//! Deterministic normalization of contract dates to ISO 8601.
//!
//! Numeric dates are read day-first (`15/01/2024` is 15 January). Month
//! names are accepted in English and Spanish.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|&(_, n)| n)
}

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[t\s].*)?$").unwrap())
}

fn day_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})$").unwrap())
}

fn day_month_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})(?:st|nd|rd|th|º|°)?(?:\s+de|\s*,)?\s*(\p{L}+)(?:\s+del?|\s*,)?\s*(\d{4})$")
            .unwrap()
    })
}

fn month_name_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\p{L}+)\s+(\d{1,2})(?:st|nd|rd|th)?\s*,?\s*(\d{4})$").unwrap()
    })
}

fn ymd(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

/// Parse a contract date in any supported format.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();
    let text = text.trim_end_matches('.');

    if let Some(c) = iso_re().captures(text) {
        return ymd(&c[1], c[2].parse().ok()?, &c[3]);
    }
    if let Some(c) = day_first_re().captures(text) {
        return ymd(&c[3], c[2].parse().ok()?, &c[1]);
    }
    if let Some(c) = day_month_name_re().captures(text) {
        return ymd(&c[3], month_number(&c[2])?, &c[1]);
    }
    if let Some(c) = month_name_day_re().captures(text) {
        return ymd(&c[3], month_number(&c[1])?, &c[2]);
    }
    None
}

/// Normalize to `YYYY-MM-DD`, or `None` when the text is not a date.
pub fn normalize_date(text: &str) -> Option<String> {
    parse_date(text).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_passes_through() {
        assert_eq!(normalize_date("2024-01-15").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date("2024-1-5").as_deref(), Some("2024-01-05"));
        assert_eq!(
            normalize_date("2024-01-15T00:00:00Z").as_deref(),
            Some("2024-01-15")
        );
    }

    #[test]
    fn numeric_dates_are_day_first() {
        assert_eq!(normalize_date("15/01/2024").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date("15-01-2024").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date("03/04/2024").as_deref(), Some("2024-04-03"));
        assert_eq!(normalize_date("01.12.2023").as_deref(), Some("2023-12-01"));
    }

    #[test]
    fn impossible_day_first_date_is_rejected() {
        // Month 15 does not exist when read day-first.
        assert_eq!(normalize_date("01/15/2024"), None);
        assert_eq!(normalize_date("31/02/2024"), None);
    }

    #[test]
    fn spanish_month_names() {
        assert_eq!(
            normalize_date("15 de Enero de 2024").as_deref(),
            Some("2024-01-15")
        );
        assert_eq!(normalize_date("15, Enero, 2024").as_deref(), Some("2024-01-15"));
        assert_eq!(
            normalize_date("1 de septiembre del 2023").as_deref(),
            Some("2023-09-01")
        );
    }

    #[test]
    fn english_month_names() {
        assert_eq!(
            normalize_date("January 15, 2024").as_deref(),
            Some("2024-01-15")
        );
        assert_eq!(normalize_date("15 January 2024").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date("March 3rd, 2022").as_deref(), Some("2022-03-03"));
    }

    #[test]
    fn non_dates() {
        assert_eq!(normalize_date("upon signature"), None);
        assert_eq!(normalize_date("15 Smarch 2024"), None);
        assert_eq!(normalize_date(""), None);
    }
}

//! Deterministic duration grammar used when the model is unavailable.
//!
//! Patterns are tried in a fixed precedence against the lowercased text:
//!
//! 1. digits: `N years [and M months]` → `N * 12 + M` (a closing paren after
//!    the digits is allowed, as in "two (2) years")
//! 2. digits: `N months`
//! 3. number words immediately before `year(s)` / `month(s)`, longest word
//!    first so "twenty-four" is never read as "four"
//!
//! An "and one day" / "and 3 days" suffix sets `has_extra_days` without
//! changing the month count.

use std::sync::OnceLock;

use pactum_core::DurationParse;
use regex::Regex;

pub const UNPARSED_REASONING: &str = "could not parse duration";

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("twenty-one", 21),
    ("twenty-two", 22),
    ("twenty-three", 23),
    ("twenty-four", 24),
    ("twenty-five", 25),
    ("twenty-six", 26),
    ("twenty-seven", 27),
    ("twenty-eight", 28),
    ("twenty-nine", 29),
    ("thirty", 30),
    ("thirty-six", 36),
    ("forty-eight", 48),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Years,
    Months,
}

impl Unit {
    fn months(self, n: u32) -> Option<u32> {
        match self {
            Unit::Years => n.checked_mul(12),
            Unit::Months => Some(n),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Unit::Years => "years",
            Unit::Months => "months",
        }
    }
}

struct WordPattern {
    word: &'static str,
    value: u32,
    unit: Unit,
    re: Regex,
}

fn years_months_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)\)?[\s-]*years?\b(?:\s*,?\s*(?:and\s+)?(\d+)\)?[\s-]*months?\b)?").unwrap()
    })
}

fn months_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\)?[\s-]*months?\b").unwrap())
}

fn extra_days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\band\s+(?:one|a|\d+)[\s-]*days?\b").unwrap())
}

/// Word patterns, longest word first; for each word `years` is tried before `months`.
fn word_patterns() -> &'static [WordPattern] {
    static PATTERNS: OnceLock<Vec<WordPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let mut words: Vec<(&'static str, u32)> = NUMBER_WORDS.to_vec();
        words.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

        let mut patterns = Vec::with_capacity(words.len() * 2);
        for (word, value) in words {
            // Compound words may be written with a space instead of a hyphen.
            let stem = regex::escape(word).replace(r"\-", "-").replace('-', r"[-\s]");
            for (unit, suffix) in [(Unit::Years, r"years?"), (Unit::Months, r"months?")] {
                let re = Regex::new(&format!(r"\b{stem}[\s-]+{suffix}\b")).unwrap();
                patterns.push(WordPattern {
                    word,
                    value,
                    unit,
                    re,
                });
            }
        }
        patterns
    })
}

fn matched(months: u32, has_extra_days: bool, description: String) -> DurationParse {
    let suffix = if has_extra_days {
        " (with extra days)"
    } else {
        ""
    };
    DurationParse {
        months: Some(months),
        has_extra_days,
        reasoning: format!("{description}{suffix}"),
    }
}

fn digits_years_months(text: &str) -> Option<(u32, String)> {
    let c = years_months_re().captures(text)?;
    let years: u32 = c[1].parse().ok()?;
    let mut months = Unit::Years.months(years)?;
    match c.get(2) {
        Some(extra) => {
            let extra: u32 = extra.as_str().parse().ok()?;
            months = months.checked_add(extra)?;
            Some((months, format!("pattern match: {years} years and {extra} months")))
        }
        None => Some((months, format!("pattern match: {years} years"))),
    }
}

fn digits_months(text: &str) -> Option<(u32, String)> {
    let c = months_re().captures(text)?;
    let months: u32 = c[1].parse().ok()?;
    Some((months, format!("pattern match: {months} months")))
}

fn number_words(text: &str) -> Option<(u32, String)> {
    word_patterns()
        .iter()
        .find(|p| p.re.is_match(text))
        .and_then(|p| {
            let months = p.unit.months(p.value)?;
            Some((months, format!("word match: {} {}", p.word, p.unit.as_str())))
        })
}

/// Parse a duration expression without any model call.
pub fn parse_duration(text: &str) -> DurationParse {
    let text = text.trim().to_lowercase();

    let found = digits_years_months(&text)
        .or_else(|| digits_months(&text))
        .or_else(|| number_words(&text));

    match found {
        Some((months, description)) => {
            matched(months, extra_days_re().is_match(&text), description)
        }
        None => DurationParse::unparsed(UNPARSED_REASONING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(text: &str) -> Option<u32> {
        parse_duration(text).months
    }

    #[test]
    fn digit_years_are_whole_multiples_of_twelve() {
        for n in [0u32, 1, 2, 3, 10, 99] {
            let parsed = parse_duration(&format!("{n} years"));
            assert_eq!(parsed.months, Some(n * 12), "{n} years");
            assert!(!parsed.has_extra_days);
        }
        assert_eq!(months("1 year"), Some(12));
    }

    #[test]
    fn digit_years_and_months_combine() {
        assert_eq!(months("2 years and 6 months"), Some(30));
        assert_eq!(months("2 years, 3 months"), Some(27));
        assert_eq!(months("1 year 1 month"), Some(13));
        assert_eq!(
            parse_duration("2 years and 6 months").reasoning,
            "pattern match: 2 years and 6 months"
        );
    }

    #[test]
    fn digit_months() {
        assert_eq!(months("18 months"), Some(18));
        assert_eq!(months("a 24-month initial term"), Some(24));
        assert_eq!(months("thirty-six (36) months"), Some(36));
    }

    #[test]
    fn word_numbers() {
        assert_eq!(months("two years"), Some(24));
        assert_eq!(months("eighteen months"), Some(18));
        assert_eq!(months("twenty-five months"), Some(25));
        assert_eq!(months("Thirty-Six Months"), Some(36));
        assert_eq!(months("one year"), Some(12));
    }

    #[test]
    fn longer_words_win_over_their_suffixes() {
        let parsed = parse_duration("twenty-four months");
        assert_eq!(parsed.months, Some(24));
        assert_eq!(parsed.reasoning, "word match: twenty-four months");
        assert_eq!(months("twenty four months"), Some(24));
        assert_eq!(months("a sixteen month pilot"), Some(16));
    }

    #[test]
    fn word_must_directly_precede_unit() {
        assert_eq!(months("two renewable years"), None);
        assert_eq!(months("someone years"), None);
    }

    #[test]
    fn extra_day_suffix_sets_flag_only() {
        let parsed = parse_duration("two years and one day");
        assert_eq!(parsed.months, Some(24));
        assert!(parsed.has_extra_days);
        assert_eq!(parsed.reasoning, "word match: two years (with extra days)");

        let parsed = parse_duration("24 months and 3 days");
        assert_eq!(parsed.months, Some(24));
        assert!(parsed.has_extra_days);

        assert!(parse_duration("2 years and a day").has_extra_days);
        assert!(!parse_duration("two years").has_extra_days);
    }

    #[test]
    fn days_alone_are_not_a_duration() {
        let parsed = parse_duration("ninety days");
        assert_eq!(parsed.months, None);
        assert!(!parsed.has_extra_days);
        assert_eq!(parsed.reasoning, UNPARSED_REASONING);
    }

    #[test]
    fn digits_take_precedence_over_words() {
        assert_eq!(months("two (2) years"), Some(24));
        assert_eq!(months("three years or 12 months"), Some(12));
    }

    #[test]
    fn indefinite_is_unparsed() {
        assert_eq!(months("indefinite"), None);
        assert_eq!(months(""), None);
    }

    #[test]
    fn overflowing_digits_are_ignored() {
        assert_eq!(months("99999999999 years"), None);
    }

    #[test]
    fn input_is_case_insensitive() {
        let parsed = parse_duration("Two Years AND ONE DAY");
        assert_eq!(parsed.months, Some(24));
        assert!(parsed.has_extra_days);
    }
}

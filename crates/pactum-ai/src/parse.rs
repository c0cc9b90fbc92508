//! Ordered parse strategies for structured model output.
//!
//! Models asked for "JSON only" still wrap answers in Markdown fences or
//! surround them with prose. Each strategy proposes a candidate slice of the
//! response; [`parse_json`] deserializes the first candidate that works.

use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The whole (trimmed) response.
    Direct,
    /// The body of the first Markdown code fence, language tag removed.
    Fenced,
    /// The first brace-balanced object found inside surrounding prose.
    Embedded,
}

impl Strategy {
    pub const CHAIN: [Strategy; 3] = [Self::Direct, Self::Fenced, Self::Embedded];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Fenced => "fenced",
            Self::Embedded => "embedded",
        }
    }

    pub fn candidate<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            Self::Direct => direct(text),
            Self::Fenced => fenced(text),
            Self::Embedded => embedded(text),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("no parse strategy succeeded ({})", summarize(.attempts))]
pub struct ParseError {
    pub attempts: Vec<(Strategy, String)>,
}

fn summarize(attempts: &[(Strategy, String)]) -> String {
    if attempts.is_empty() {
        return "empty response".to_string();
    }
    attempts
        .iter()
        .map(|(s, e)| format!("{s}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Deserialize `text` with the first strategy whose candidate parses.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<(T, Strategy), ParseError> {
    let mut attempts = Vec::new();
    for strategy in Strategy::CHAIN {
        let Some(candidate) = strategy.candidate(text) else {
            continue;
        };
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok((value, strategy)),
            Err(e) => attempts.push((strategy, e.to_string())),
        }
    }
    Err(ParseError { attempts })
}

pub fn direct(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub fn fenced(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    // Language tag such as `json` or `JSON`.
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    let body = body.trim();
    (!body.is_empty()).then_some(body)
}

pub fn embedded(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        months: Option<u32>,
    }

    #[test]
    fn direct_json() {
        let (probe, strategy) = parse_json::<Probe>("  {\"months\": 24}\n").unwrap();
        assert_eq!(probe.months, Some(24));
        assert_eq!(strategy, Strategy::Direct);
    }

    #[test]
    fn fenced_json_with_language_tag() {
        let text = "```json\n{\"months\": 18}\n```";
        let (probe, strategy) = parse_json::<Probe>(text).unwrap();
        assert_eq!(probe.months, Some(18));
        assert_eq!(strategy, Strategy::Fenced);
    }

    #[test]
    fn fenced_without_tag_or_closing_fence() {
        assert_eq!(fenced("```\n{\"months\": null}"), Some("{\"months\": null}"));
        assert_eq!(fenced("no fences here"), None);
    }

    #[test]
    fn embedded_object_in_prose() {
        let text = "Sure! Here is the data: {\"months\": 12, \"note\": \"a } brace\"} Hope it helps.";
        assert_eq!(
            embedded(text),
            Some("{\"months\": 12, \"note\": \"a } brace\"}")
        );
        let (probe, strategy) = parse_json::<Probe>(text).unwrap();
        assert_eq!(probe.months, Some(12));
        assert_eq!(strategy, Strategy::Embedded);
    }

    #[test]
    fn embedded_handles_escaped_quotes() {
        let text = r#"x {"a": "say \"hi\" {", "b": {"c": 1}} y"#;
        assert_eq!(embedded(text), Some(r#"{"a": "say \"hi\" {", "b": {"c": 1}}"#));
    }

    #[test]
    fn unbalanced_object_has_no_candidate() {
        assert_eq!(embedded("{\"months\": 3"), None);
    }

    #[test]
    fn prose_only_fails_with_attempts() {
        let err = parse_json::<Probe>("I cannot determine the duration.").unwrap_err();
        assert_eq!(err.attempts.len(), 1);
        assert_eq!(err.attempts[0].0, Strategy::Direct);
        assert!(err.to_string().starts_with("no parse strategy succeeded (direct:"));
    }

    #[test]
    fn empty_response_has_no_attempts() {
        let err = parse_json::<Probe>("   ").unwrap_err();
        assert!(err.attempts.is_empty());
        assert_eq!(err.to_string(), "no parse strategy succeeded (empty response)");
    }
}

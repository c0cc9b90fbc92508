//! Structured fact extraction from raw contract text.
//!
//! One model call per contract. Whatever goes wrong (transport, timeout,
//! unparsable or out-of-range output) collapses to
//! [`ExtractionOutcome::fallback`].

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use pactum_core::{ContractFacts, ExtractionOutcome, Party};
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::dates;
use crate::inference::{GenerateRequest, InferenceClient, InferenceError, generate_with_timeout};
use crate::parse::{self, ParseError};

pub const DEFAULT_MAX_CHARS: usize = 30_000;
pub const TRUNCATION_MARKER: &str = "\n\n[... TRUNCATED ...]";

/// Confidence assumed when the model omits one.
const DEFAULT_CONFIDENCE: f64 = 0.8;

// ── Prompt templates ──

const SYSTEM_PROMPT: &str = "\
You are an expert legal analyst specializing in contract information extraction.
Your task is to extract structured data from the provided contract text.

IMPORTANT INSTRUCTIONS:

1. Extract ONLY information that explicitly appears in the text

2. For effective_date: Convert to ISO format (YYYY-MM-DD)
   Dates may be in DAY-MONTH-YEAR format (common in Latin America and Europe)
   - Support Spanish months: Enero, Febrero, Marzo, Abril, Mayo, Junio, Julio, Agosto, Septiembre, Octubre, Noviembre, Diciembre
   - Support English months: January, February, March, April, May, June, July, August, September, October, November, December
   - Examples:
     * \"15 de Enero de 2024\" -> \"2024-01-15\"
     * \"January 15, 2024\" -> \"2024-01-15\"
     * \"15/01/2024\" -> \"2024-01-15\" (DD/MM/YYYY format)
     * \"15-01-2024\" -> \"2024-01-15\" (DD-MM-YYYY format)
   - ASSUME DD/MM/YYYY format for numeric dates (day first, then month)

3. For duration: convert to integer months (DO NOT round up partial periods)
   - \"one year\" = 12 months
   - \"two years and one day\" = 24 months (keep the extra days in contract_duration_raw)
   - \"one and a half years\" = 18 months
   - \"un año\" = 12 months, \"dos años\" = 24 months
   - \"indefinite\" / \"indefinido\" or not found = null
   Always store the EXACT original text in contract_duration_raw

4. For risk_score: analyze the contract language
   - Unilateral clauses, excessive penalties = high score (70-100)
   - Balanced language, mutual protections = low score (1-30)
   - Standard terms = medium score (30-70)

5. If you cannot find a field, use null

6. For parties: extract name and role (Seller/Vendedor, Buyer/Comprador, Licensor, Licensee, etc.)

7. For jurisdiction: extract the governing law location (city/state/country)

Respond ONLY with a JSON object of this shape, no additional text:
{
  \"parties\": [{\"name\": \"...\", \"role\": \"...\" or null}],
  \"effective_date\": \"YYYY-MM-DD\" or null,
  \"contract_duration_months\": integer or null,
  \"contract_duration_raw\": \"original duration text\" or null,
  \"jurisdiction\": \"...\" or null,
  \"risk_score\": integer 1-100,
  \"confidence\": number 0-1
}";

fn build_user_prompt(contract_text: &str) -> String {
    format!(
        "Extract structured information from this contract:\n\
         \n\
         --- CONTRACT START ---\n\
         {contract_text}\n\
         --- CONTRACT END ---\n\
         \n\
         Return the JSON with extracted data:"
    )
}

/// Cut `text` to at most `max_chars` characters plus [`TRUNCATION_MARKER`].
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..byte_end])),
        None => Cow::Borrowed(text),
    }
}

// ── Types ──

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub max_chars: usize,
    pub max_output_tokens: u32,
    pub call_timeout: Duration,
    pub temperature: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            max_output_tokens: 2048,
            call_timeout: Duration::from_secs(60),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelParty {
    Named {
        name: Option<String>,
        role: Option<String>,
    },
    Bare(String),
}

/// An integer as models actually write it: `24`, `24.0` or `"24"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WholeNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl WholeNumber {
    fn value(self) -> Result<i64, String> {
        match self {
            WholeNumber::Int(n) => Ok(n),
            WholeNumber::Float(f) => whole_float(f),
            WholeNumber::Text(text) => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(n) => Ok(n),
                    Err(_) => text
                        .parse::<f64>()
                        .map_err(|_| format!("{text:?} is not a number"))
                        .and_then(whole_float),
                }
            }
        }
    }
}

fn whole_float(f: f64) -> Result<i64, String> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(format!("{f} is not a whole number"))
    }
}

fn whole_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let Some(raw) = Option::<WholeNumber>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let n = raw.value().map_err(D::Error::custom)?;
    T::try_from(n)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("{n} is out of range")))
}

/// Payload shape requested in [`SYSTEM_PROMPT`].
#[derive(Debug, Deserialize)]
struct ModelExtraction {
    #[serde(default)]
    parties: Option<Vec<ModelParty>>,
    #[serde(default)]
    effective_date: Option<String>,
    #[serde(default, alias = "duration_months", deserialize_with = "whole_number")]
    contract_duration_months: Option<u32>,
    #[serde(default, alias = "duration_raw")]
    contract_duration_raw: Option<String>,
    #[serde(default)]
    jurisdiction: Option<String>,
    #[serde(default, deserialize_with = "whole_number")]
    risk_score: Option<i64>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("risk_score {0} outside 1..=100")]
    RiskOutOfRange(i64),
    #[error("confidence {0} outside 0..=1")]
    ConfidenceOutOfRange(f64),
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ModelExtraction {
    fn into_outcome(self) -> Result<ExtractionOutcome, ExtractError> {
        let risk_score = self
            .risk_score
            .unwrap_or(i64::from(pactum_core::facts::DEFAULT_RISK_SCORE));
        if !(1..=100).contains(&risk_score) {
            return Err(ExtractError::RiskOutOfRange(risk_score));
        }
        let confidence = self.confidence.unwrap_or(DEFAULT_CONFIDENCE);
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ExtractError::ConfidenceOutOfRange(confidence));
        }

        let parties = self
            .parties
            .unwrap_or_default()
            .into_iter()
            .map(|p| match p {
                ModelParty::Named { name, role } => Party {
                    name: non_blank(name).unwrap_or_else(|| "Unknown".to_string()),
                    role: non_blank(role),
                },
                ModelParty::Bare(name) => Party {
                    name: non_blank(Some(name)).unwrap_or_else(|| "Unknown".to_string()),
                    role: None,
                },
            })
            .collect();

        let effective_date = non_blank(self.effective_date).and_then(|raw| {
            let normalized = dates::normalize_date(&raw);
            if normalized.is_none() {
                warn!(date = %raw, "dropping effective_date that is not a recognisable date");
            }
            normalized
        });

        let facts = ContractFacts {
            parties,
            effective_date,
            duration_months: self.contract_duration_months,
            // Verbatim, including surrounding whitespace.
            duration_raw: self.contract_duration_raw.filter(|d| !d.trim().is_empty()),
            jurisdiction: non_blank(self.jurisdiction),
            risk_score: risk_score as u8,
        };
        Ok(ExtractionOutcome::new(facts, confidence))
    }
}

/// LLM-backed contract fact extractor.
pub struct Extractor {
    client: Arc<dyn InferenceClient>,
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(client: Arc<dyn InferenceClient>, config: ExtractionConfig) -> Self {
        Self { client, config }
    }

    /// Extract facts from `contract_text`. Never fails; see the module docs.
    pub async fn extract(&self, contract_text: &str) -> ExtractionOutcome {
        match self.try_extract(contract_text).await {
            Ok(outcome) => {
                info!(
                    model = self.client.model(),
                    confidence = outcome.confidence,
                    parties = outcome.facts.parties.len(),
                    "contract facts extracted"
                );
                outcome
            }
            Err(e) => {
                warn!(model = self.client.model(), error = %e, "extraction failed, using defaults");
                ExtractionOutcome::fallback()
            }
        }
    }

    async fn try_extract(&self, contract_text: &str) -> Result<ExtractionOutcome, ExtractError> {
        let text = truncate(contract_text, self.config.max_chars);
        let request = GenerateRequest {
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            user_prompt: build_user_prompt(&text),
            max_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        };
        let response =
            generate_with_timeout(self.client.as_ref(), request, self.config.call_timeout).await?;
        let (payload, strategy) = parse::parse_json::<ModelExtraction>(&response.text)?;
        tracing::debug!(strategy = %strategy, tokens = response.tokens_used, "parsed extraction payload");
        payload.into_outcome()
    }
}

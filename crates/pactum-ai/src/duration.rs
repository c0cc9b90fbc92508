//! Hybrid duration normalization: one model call, deterministic fallback.

use std::sync::Arc;
use std::time::Duration;

use pactum_core::DurationParse;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::fallback;
use crate::inference::{GenerateRequest, InferenceClient, InferenceError, generate_with_timeout};
use crate::parse::{self, ParseError};

const SYSTEM_PROMPT: &str = "\
You are an expert at interpreting contract duration terms.
Analyze the duration and determine the number of COMPLETE months.

RULES:
- 1 year = 12 months
- DO NOT round up partial periods to the next month
- \"two years\" = 24 months
- \"two years and one day\" = 24 months (but note there are extra days)
- \"one and a half years\" = 18 months
- Report if there are extra days/weeks beyond complete months

Respond with JSON only:
{
  \"months\": <integer number of complete months, or null if indefinite>,
  \"has_extra_days\": <true if there are additional days beyond complete months>,
  \"reasoning\": \"<one sentence explanation>\"
}";

fn build_user_prompt(text: &str) -> String {
    format!("Analyze this duration: \"{text}\"")
}

#[derive(Deserialize)]
struct ModelDuration {
    months: Option<u32>,
    #[serde(default)]
    has_extra_days: bool,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, thiserror::Error)]
enum NormalizeError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Converts free-text durations into whole months plus an extra-days flag.
pub struct DurationNormalizer {
    client: Arc<dyn InferenceClient>,
    call_timeout: Duration,
    max_tokens: u32,
}

impl DurationNormalizer {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            client,
            call_timeout: Duration::from_secs(30),
            max_tokens: 256,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Normalize `text`. Never fails: model trouble routes to the
    /// deterministic grammar, which yields `months: None` when nothing matches.
    pub async fn normalize(&self, text: &str) -> DurationParse {
        match self.ask_model(text).await {
            Ok(parsed) => {
                debug!(text, months = ?parsed.months, "duration normalized by model");
                parsed
            }
            Err(e) => {
                warn!(text, error = %e, "model duration parse failed, using fallback grammar");
                fallback::parse_duration(text)
            }
        }
    }

    async fn ask_model(&self, text: &str) -> Result<DurationParse, NormalizeError> {
        let request = GenerateRequest {
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            user_prompt: build_user_prompt(text),
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };
        let response = generate_with_timeout(self.client.as_ref(), request, self.call_timeout).await?;
        let (answer, _) = parse::parse_json::<ModelDuration>(&response.text)?;
        Ok(DurationParse {
            months: answer.months,
            has_extra_days: answer.months.is_some() && answer.has_extra_days,
            reasoning: answer.reasoning,
        })
    }
}

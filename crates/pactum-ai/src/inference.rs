//! The inference collaborator: a system + user prompt pair in, free text out.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model returned no text")]
    EmptyResponse,
    #[error("inference call timed out after {0:?}")]
    Timeout(Duration),
    #[error("inference unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
    pub tokens_used: u32,
}

/// A text-generation backend.
///
/// Implementations make exactly one attempt per call; callers own any
/// fallback behaviour.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, InferenceError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Run one generate call under a wall-clock deadline.
pub async fn generate_with_timeout(
    client: &dyn InferenceClient,
    request: GenerateRequest,
    timeout: Duration,
) -> Result<GenerateResponse, InferenceError> {
    match tokio::time::timeout(timeout, client.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(InferenceError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl InferenceClient for Stalled {
        async fn generate(&self, _: GenerateRequest) -> Result<GenerateResponse, InferenceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(InferenceError::EmptyResponse)
        }

        fn model(&self) -> &str {
            "stalled"
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            system_prompt: None,
            user_prompt: "ping".into(),
            max_tokens: 8,
            temperature: 0.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_is_a_timeout_error() {
        let err = generate_with_timeout(&Stalled, request(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Timeout(d) if d == Duration::from_secs(5)));
    }
}

//! Scripted inference backend (testing and offline runs).
//!
//! Replays queued outcomes in order; once the script runs out every call
//! fails with [`InferenceError::Unavailable`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::inference::{GenerateRequest, GenerateResponse, InferenceClient, InferenceError};

enum Scripted {
    Text(String),
    Failure(String),
}

#[derive(Default)]
pub struct ScriptedInference {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend on which every call fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Text(text.into()));
        self
    }

    /// Queue a failed call.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Failure(message.into()));
        self
    }

    fn push(&self, item: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(item);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, InferenceError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(GenerateResponse {
                tokens_used: text.split_whitespace().count() as u32,
                text,
            }),
            Some(Scripted::Failure(message)) => Err(InferenceError::Unavailable(message)),
            None => Err(InferenceError::Unavailable("script exhausted".into())),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

//! LLM layer: the inference seam, structured contract extraction, and
//! hybrid (model + deterministic fallback) duration normalization.

pub mod dates;
pub mod duration;
pub mod extractor;
pub mod fake;
pub mod fallback;
pub mod gemini;
pub mod inference;
pub mod parse;

pub use duration::DurationNormalizer;
pub use extractor::{ExtractionConfig, Extractor};
pub use gemini::{GeminiClient, GeminiConfig};
pub use inference::{GenerateRequest, GenerateResponse, InferenceClient, InferenceError};

//! Error types for prompt-forge operations.
//!
//! Two layers of errors exist:
//! - [`LlmError`] describes what went wrong while talking to a provider. It
//!   never leaves the `llm` module: the text generator folds it into a
//!   [`GenerationResult::Failure`](crate::llm::GenerationResult).
//! - [`OptimizerError`] is what every optimizer operation returns and what
//!   the HTTP layer maps onto status codes.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("LLM response contained no text content")]
    EmptyResponse,
}

/// The step of a run during which a generation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    /// Producing outputs for examples with the prompt under test.
    Generation,
    /// The critique call over a whole batch.
    BatchAnalysis,
    /// Producing synthetic examples.
    ExampleGeneration,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GenerationStage::Generation => "generation",
            GenerationStage::BatchAnalysis => "batch analysis",
            GenerationStage::ExampleGeneration => "example generation",
        };
        f.write_str(label)
    }
}

/// Errors surfaced by optimization, prompt testing and example generation.
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// No credential was configured for the text generator.
    #[error("OpenAI API key not configured.")]
    NotConfigured,

    /// A required request field was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// The generation capability failed; the current round is discarded.
    #[error("LLM call failed during {stage}: {reason}")]
    Generation {
        stage: GenerationStage,
        reason: String,
    },
}

impl OptimizerError {
    /// Build a generation failure for the given stage.
    pub fn generation(stage: GenerationStage, reason: impl Into<String>) -> Self {
        OptimizerError::Generation {
            stage,
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the
    /// server or the provider.
    pub fn is_client_error(&self) -> bool {
        matches!(self, OptimizerError::Validation(_))
    }
}

/// Result type alias for optimizer operations.
pub type OptimizerResult<T> = Result<T, OptimizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_message_names_stage() {
        let err = OptimizerError::generation(GenerationStage::BatchAnalysis, "boom");
        assert_eq!(err.to_string(), "LLM call failed during batch analysis: boom");

        let err = OptimizerError::generation(GenerationStage::ExampleGeneration, "timeout");
        assert_eq!(
            err.to_string(),
            "LLM call failed during example generation: timeout"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(OptimizerError::Validation("Missing examples".to_string()).is_client_error());
        assert!(!OptimizerError::NotConfigured.is_client_error());
        assert!(!OptimizerError::generation(GenerationStage::Generation, "x").is_client_error());
    }

    #[test]
    fn test_not_configured_message() {
        assert_eq!(
            OptimizerError::NotConfigured.to_string(),
            "OpenAI API key not configured."
        );
    }
}

//! Text generation boundary used by the optimizer.
//!
//! [`TextGenerator`] turns a prompt, an optional system instruction and
//! sampling parameters into a [`GenerationResult`]. Provider errors are
//! folded into [`GenerationResult::Failure`] here and go no further.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::openai::{GenerationRequest, LlmProvider, Message, OpenAiClient};
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::metrics::{MetricsCollector, TokenUsage};

/// Sampling temperature used when a caller has no specific preference.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Failure reason reported when no credential is configured.
pub const NOT_CONFIGURED_REASON: &str = "OpenAI API key not configured.";

/// Outcome of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Generated text, trimmed of surrounding whitespace.
    Text(String),
    /// Human-readable reason the call failed.
    Failure(String),
}

/// Wraps an optional LLM provider behind the generation contract.
///
/// Built once at start-up from an [`LlmConfig`] and shared read-only
/// afterwards.
pub struct TextGenerator {
    provider: Option<Arc<dyn LlmProvider>>,
    model: String,
    metrics: MetricsCollector,
}

impl TextGenerator {
    /// Build a generator from configuration.
    ///
    /// A configuration without a credential yields an unconfigured generator
    /// whose every call fails fast.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider: Option<Arc<dyn LlmProvider>> = if config.has_api_key() {
            Some(Arc::new(OpenAiClient::from_config(config)?))
        } else {
            None
        };

        Ok(Self {
            provider,
            model: config.model.clone(),
            metrics: MetricsCollector::new(),
        })
    }

    /// Build a generator over an arbitrary provider.
    pub fn with_provider(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            model: model.into(),
            metrics: MetricsCollector::new(),
        }
    }

    /// Build a generator with no credential.
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            model: String::new(),
            metrics: MetricsCollector::new(),
        }
    }

    /// Whether a credential is available. Check before starting a batch.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text for a prompt. Makes exactly one provider call.
    pub async fn generate(
        &self,
        prompt: &str,
        system_message: Option<&str>,
        temperature: f64,
        max_tokens: u32,
    ) -> GenerationResult {
        let Some(provider) = self.provider.as_ref() else {
            return GenerationResult::Failure(NOT_CONFIGURED_REASON.to_string());
        };

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_message.filter(|s| !s.is_empty()) {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));

        let request = GenerationRequest::new(self.model.clone(), messages)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        debug!(
            model = %self.model,
            temperature,
            max_tokens,
            prompt_chars = prompt.len(),
            "Sending generation request"
        );

        let started = Instant::now();
        let outcome = provider.generate(request).await;
        let latency = started.elapsed().as_secs_f64();

        let result = match outcome {
            Ok(response) => {
                let tokens = TokenUsage::new(
                    response.usage.prompt_tokens.into(),
                    response.usage.completion_tokens.into(),
                );
                match response.first_content() {
                    Some(content) => {
                        self.metrics
                            .record_llm_request(&self.model, true, latency, tokens);
                        return GenerationResult::Text(content.trim().to_string());
                    }
                    None => LlmError::EmptyResponse,
                }
            }
            Err(err) => err,
        };

        self.metrics
            .record_llm_request(&self.model, false, latency, TokenUsage::default());
        warn!(model = %self.model, error = %result, "Generation request failed");
        GenerationResult::Failure(format!("OpenAI API call failed: {}", result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmProvider;

    #[tokio::test]
    async fn test_unconfigured_fails_fast() {
        let generator = TextGenerator::unconfigured();
        assert!(!generator.is_configured());

        let result = generator.generate("Hello!", None, DEFAULT_TEMPERATURE, 5).await;
        assert_eq!(
            result,
            GenerationResult::Failure(NOT_CONFIGURED_REASON.to_string())
        );
    }

    #[test]
    fn test_from_config_without_key_is_unconfigured() {
        let generator = TextGenerator::from_config(&LlmConfig::new()).expect("should build");
        assert!(!generator.is_configured());
        assert_eq!(generator.model(), "gpt-4o");
    }

    #[test]
    fn test_from_config_with_key_is_configured() {
        let config = LlmConfig::new().with_api_key("sk-test");
        let generator = TextGenerator::from_config(&config).expect("should build");
        assert!(generator.is_configured());
    }

    #[tokio::test]
    async fn test_generate_trims_and_builds_request() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Ok("  hi there \n".to_string())]));
        let generator = TextGenerator::with_provider(mock.clone(), "gpt-4o");

        let result = generator
            .generate("prompt", Some("be brief"), 0.3, 500)
            .await;
        assert_eq!(result, GenerationResult::Text("hi there".to_string()));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.system_content(), Some("be brief"));
        assert_eq!(request.user_content(), Some("prompt"));
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(500));
    }

    #[tokio::test]
    async fn test_generate_omits_absent_system_message() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Ok("ok".to_string())]));
        let generator = TextGenerator::with_provider(mock.clone(), "gpt-4o");

        let _ = generator.generate("prompt", None, DEFAULT_TEMPERATURE, 200).await;

        let requests = mock.requests();
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role, "user");
    }

    #[tokio::test]
    async fn test_null_content_becomes_failure() {
        use serde_json::json;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": null},
                    "finish_reason": "content_filter"
                }]
            })))
            .mount(&server)
            .await;

        let config = LlmConfig::new()
            .with_api_key("sk-test")
            .with_api_base(server.uri());
        let generator = TextGenerator::from_config(&config).expect("should build");

        let result = generator.generate("p", Some("s"), 0.3, 500).await;
        match result {
            GenerationResult::Failure(reason) => {
                assert!(reason.contains("no text content"), "unexpected reason: {reason}");
            }
            GenerationResult::Text(text) => panic!("expected failure, got text {text:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_error_becomes_failure() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Err(LlmError::RequestFailed(
            "connection reset".to_string(),
        ))]));
        let generator = TextGenerator::with_provider(mock, "gpt-4o");

        let result = generator.generate("prompt", None, DEFAULT_TEMPERATURE, 200).await;
        match result {
            GenerationResult::Failure(reason) => {
                assert!(reason.starts_with("OpenAI API call failed:"));
                assert!(reason.contains("connection reset"));
            }
            GenerationResult::Text(text) => panic!("expected failure, got text {text:?}"),
        }
    }
}

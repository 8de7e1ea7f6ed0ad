//! Credential probe.

use serde::{Deserialize, Serialize};

use crate::llm::{GenerationResult, TextGenerator, DEFAULT_TEMPERATURE};

const PROBE_PROMPT: &str = "Hello!";
const PROBE_MAX_TOKENS: u32 = 5;

/// Outcome of a credential probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCheck {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Send a tiny request to confirm the configured credential works.
pub async fn check_key(generator: &TextGenerator) -> KeyCheck {
    match generator
        .generate(PROBE_PROMPT, None, DEFAULT_TEMPERATURE, PROBE_MAX_TOKENS)
        .await
    {
        GenerationResult::Text(text) => KeyCheck {
            success: true,
            message: "OpenAI API key is working.".to_string(),
            response: Some(text),
        },
        GenerationResult::Failure(reason) => KeyCheck {
            success: false,
            message: reason,
            response: None,
        },
    }
}

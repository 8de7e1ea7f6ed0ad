//! Synthetic example generation.
//!
//! Seeds are shown to the model as `Input:`/`Output:` pairs and the reply is
//! parsed back with a line-oriented parser that drops anything malformed.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::batch::Example;
use crate::error::{GenerationStage, OptimizerError, OptimizerResult};
use crate::llm::{GenerationResult, TextGenerator};
use crate::metrics::MetricsCollector;
use crate::prompts::{build_synthetic_prompt, SYNTHETIC_SYSTEM_PROMPT};

/// Pairs requested when the caller does not say how many.
pub const DEFAULT_NUM_TO_GENERATE: usize = 5;

/// Sampling temperature for example generation.
pub const SYNTHETIC_TEMPERATURE: f64 = 0.8;

/// Token budget for example generation.
pub const SYNTHETIC_MAX_TOKENS: u32 = 1000;

/// A generated input/output pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticExample {
    pub input: String,
    pub output: String,
}

/// Parsed examples together with the instruction that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticGeneration {
    pub generated_examples: Vec<SyntheticExample>,
    pub prompt_used: String,
}

fn render_seed_examples(examples: &[Example]) -> String {
    let mut block = String::new();
    for example in examples {
        let _ = write!(
            block,
            "Input: {}\nOutput: {}\n\n",
            example.input.as_deref().unwrap_or_default(),
            example.output.as_deref().unwrap_or_default()
        );
    }
    block
}

/// Ask the model for `num_to_generate` new pairs modelled on `examples`.
///
/// The model may return fewer or more pairs than requested; whatever parses
/// is returned.
pub async fn generate_examples(
    generator: &TextGenerator,
    examples: &[Example],
    num_to_generate: usize,
) -> OptimizerResult<SyntheticGeneration> {
    if examples.is_empty() {
        return Err(OptimizerError::Validation(
            "Missing examples to base generation on".to_string(),
        ));
    }
    if !generator.is_configured() {
        return Err(OptimizerError::NotConfigured);
    }

    let prompt_used = build_synthetic_prompt(&render_seed_examples(examples), num_to_generate);

    let reply = match generator
        .generate(
            &prompt_used,
            Some(SYNTHETIC_SYSTEM_PROMPT),
            SYNTHETIC_TEMPERATURE,
            SYNTHETIC_MAX_TOKENS,
        )
        .await
    {
        GenerationResult::Text(text) => text,
        GenerationResult::Failure(reason) => {
            return Err(OptimizerError::generation(
                GenerationStage::ExampleGeneration,
                reason,
            ));
        }
    };

    let generated_examples = parse_synthetic_examples(&reply);
    MetricsCollector::new().record_synthetic_examples(generated_examples.len());
    info!(
        requested = num_to_generate,
        parsed = generated_examples.len(),
        "Generated synthetic examples"
    );

    Ok(SyntheticGeneration {
        generated_examples,
        prompt_used,
    })
}

/// Parse `Input:`/`Output:` pairs out of free text.
///
/// An `Output:` line closes the pending input; without one it is ignored. A
/// blank line drops a pending input. Every other line is ignored.
pub fn parse_synthetic_examples(text: &str) -> Vec<SyntheticExample> {
    let mut examples = Vec::new();
    let mut pending: Option<String> = None;

    for line in text.lines().map(str::trim) {
        if let Some(input) = line.strip_prefix("Input:") {
            pending = Some(input.trim().to_string());
        } else if let Some(output) = line.strip_prefix("Output:") {
            if let Some(input) = pending.take() {
                examples.push(SyntheticExample {
                    input,
                    output: output.trim().to_string(),
                });
            }
        } else if line.is_empty() {
            pending = None;
        }
    }

    examples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::mock::MockLlmProvider;
    use std::sync::Arc;

    fn pair(input: &str, output: &str) -> SyntheticExample {
        SyntheticExample {
            input: input.to_string(),
            output: output.to_string(),
        }
    }

    #[test]
    fn test_parse_drops_dangling_input() {
        let parsed = parse_synthetic_examples("Input: x\nOutput: y\n\nInput: p");
        assert_eq!(parsed, vec![pair("x", "y")]);
    }

    #[test]
    fn test_parse_ignores_output_without_input() {
        let parsed = parse_synthetic_examples("Output: orphan\nInput: a\nOutput: b");
        assert_eq!(parsed, vec![pair("a", "b")]);
    }

    #[test]
    fn test_parse_blank_line_resets_pending_input() {
        let parsed = parse_synthetic_examples("Input: a\n\nOutput: b\nInput: c\nOutput: d");
        assert_eq!(parsed, vec![pair("c", "d")]);
    }

    #[test]
    fn test_parse_trims_lines_and_skips_noise() {
        let text = "Here you go:\n  Input:  first \n  some note\n  Output: 1st  \n\n1. Input: no\nInput: second\nOutput:\n";
        let parsed = parse_synthetic_examples(text);
        assert_eq!(parsed, vec![pair("first", "1st"), pair("second", "")]);
    }

    #[test]
    fn test_parse_later_input_replaces_pending_one() {
        let parsed = parse_synthetic_examples("Input: a\nInput: b\nOutput: B");
        assert_eq!(parsed, vec![pair("b", "B")]);
    }

    #[test]
    fn test_seed_rendering_uses_empty_for_missing_fields() {
        let examples = vec![
            Example::new("a", "A"),
            Example {
                input: None,
                output: Some("B".to_string()),
            },
        ];
        assert_eq!(
            render_seed_examples(&examples),
            "Input: a\nOutput: A\n\nInput: \nOutput: B\n\n"
        );
    }

    #[tokio::test]
    async fn test_generate_examples_parses_reply() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Ok(
            "Input: cat\nOutput: CAT\n\nInput: dog\nOutput: DOG".to_string(),
        )]));
        let generator = TextGenerator::with_provider(mock.clone(), "gpt-4o");

        let generation = generate_examples(&generator, &[Example::new("a", "A")], 2)
            .await
            .expect("generation should succeed");

        assert_eq!(
            generation.generated_examples,
            vec![pair("cat", "CAT"), pair("dog", "DOG")]
        );
        assert!(generation.prompt_used.contains("Input: a\nOutput: A\n\n"));
        assert!(generation.prompt_used.contains("generate 2 new, distinct"));

        let requests = mock.requests();
        assert_eq!(requests[0].temperature, Some(SYNTHETIC_TEMPERATURE));
        assert_eq!(requests[0].max_tokens, Some(SYNTHETIC_MAX_TOKENS));
        assert_eq!(requests[0].system_content(), Some(SYNTHETIC_SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn test_generate_examples_error_cases() {
        let generator = TextGenerator::unconfigured();
        let err = generate_examples(&generator, &[], 5)
            .await
            .expect_err("empty seeds should fail");
        assert_eq!(err.to_string(), "Missing examples to base generation on");

        let err = generate_examples(&generator, &[Example::new("a", "A")], 5)
            .await
            .expect_err("unconfigured should fail");
        assert!(matches!(err, OptimizerError::NotConfigured));

        let mock = Arc::new(MockLlmProvider::scripted(vec![Err(LlmError::RequestFailed(
            "timeout".to_string(),
        ))]));
        let generator = TextGenerator::with_provider(mock, "gpt-4o");
        let err = generate_examples(&generator, &[Example::new("a", "A")], 5)
            .await
            .expect_err("provider failure should fail");
        assert!(err
            .to_string()
            .starts_with("LLM call failed during example generation:"));
    }

    #[test]
    fn test_generation_serializes_camel_case() {
        let generation = SyntheticGeneration {
            generated_examples: vec![pair("a", "b")],
            prompt_used: "p".to_string(),
        };
        let json = serde_json::to_value(&generation).expect("serializes");
        assert_eq!(json["generatedExamples"][0]["input"], "a");
        assert_eq!(json["promptUsed"], "p");
    }
}

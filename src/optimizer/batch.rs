//! Batch example runner.
//!
//! Applies a prompt to every example of a set, in order, one generation call
//! at a time. [`run_batch`] is the strict variant used by the optimization
//! loop; [`test_prompt`] keeps going past failures and reports them per
//! example.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::template::render;
use crate::error::{GenerationStage, OptimizerError, OptimizerResult};
use crate::llm::{GenerationResult, TextGenerator, DEFAULT_TEMPERATURE};

/// Token budget for generating an example output with the prompt under test.
pub const GENERATION_MAX_TOKENS: u32 = 200;

/// Generated output recorded for examples that could not be processed.
pub const SKIPPED_OUTPUT: &str = "SKIPPED - Missing input or output";

/// A desired input/output pair. Both fields may be absent at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl Example {
    /// Create a complete example.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            output: Some(output.into()),
        }
    }

    /// The input/output pair if both are present and non-empty.
    pub fn usable_pair(&self) -> Option<(&str, &str)> {
        let input = self.input.as_deref().filter(|s| !s.is_empty())?;
        let output = self.output.as_deref().filter(|s| !s.is_empty())?;
        Some((input, output))
    }
}

/// Whether an example took part in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Processed,
    Skipped,
}

/// Result of applying the current prompt to one example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub input: Option<String>,
    pub desired_output: Option<String>,
    pub generated_output: String,
    pub status: BatchStatus,
}

impl BatchItem {
    fn skipped(example: &Example) -> Self {
        Self {
            input: example.input.clone(),
            desired_output: example.output.clone(),
            generated_output: SKIPPED_OUTPUT.to_string(),
            status: BatchStatus::Skipped,
        }
    }

    /// Whether the item was processed.
    pub fn is_processed(&self) -> bool {
        self.status == BatchStatus::Processed
    }
}

/// Run the prompt over every example.
///
/// Examples with a missing or empty field are skipped without a generation
/// call. The first generation failure aborts the whole batch.
pub async fn run_batch(
    generator: &TextGenerator,
    prompt: &str,
    examples: &[Example],
) -> OptimizerResult<Vec<BatchItem>> {
    let mut items = Vec::with_capacity(examples.len());

    for (idx, example) in examples.iter().enumerate() {
        let Some((input, desired)) = example.usable_pair() else {
            debug!(example = idx + 1, "Skipping example with missing input or output");
            items.push(BatchItem::skipped(example));
            continue;
        };

        let rendered = render(prompt, input);
        let generated = match generator
            .generate(&rendered, None, DEFAULT_TEMPERATURE, GENERATION_MAX_TOKENS)
            .await
        {
            GenerationResult::Text(text) => text,
            GenerationResult::Failure(reason) => {
                return Err(OptimizerError::generation(GenerationStage::Generation, reason));
            }
        };

        items.push(BatchItem {
            input: Some(input.to_string()),
            desired_output: Some(desired.to_string()),
            generated_output: generated,
            status: BatchStatus::Processed,
        });
    }

    Ok(items)
}

/// Outcome of running a prompt on one example outside the optimization loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTestResult {
    pub example_input: String,
    pub desired_output: Option<String>,
    pub generated_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// Run a prompt over examples, recording failures per example.
///
/// Only an absent input is rejected; an empty input is rendered as is.
pub async fn test_prompt(
    generator: &TextGenerator,
    prompt: &str,
    examples: &[Example],
) -> OptimizerResult<Vec<PromptTestResult>> {
    if prompt.is_empty() || examples.is_empty() {
        return Err(OptimizerError::Validation(
            "Missing initialPrompt or examples".to_string(),
        ));
    }
    if !generator.is_configured() {
        return Err(OptimizerError::NotConfigured);
    }

    let mut results = Vec::with_capacity(examples.len());
    for example in examples {
        let Some(input) = example.input.as_deref() else {
            results.push(PromptTestResult {
                example_input: "N/A - Missing".to_string(),
                desired_output: example.output.clone(),
                generated_output: "N/A - Input missing".to_string(),
                error: Some("Input missing for this example.".to_string()),
                error_detail: None,
            });
            continue;
        };

        let rendered = render(prompt, input);
        let mut result = PromptTestResult {
            example_input: input.to_string(),
            desired_output: example.output.clone(),
            generated_output: String::new(),
            error: None,
            error_detail: None,
        };

        match generator
            .generate(&rendered, None, DEFAULT_TEMPERATURE, GENERATION_MAX_TOKENS)
            .await
        {
            GenerationResult::Text(text) => result.generated_output = text,
            GenerationResult::Failure(reason) => {
                result.generated_output = "Error during generation.".to_string();
                result.error_detail = Some(reason);
            }
        }

        results.push(result);
    }

    let failed = results
        .iter()
        .filter(|r| r.error.is_some() || r.error_detail.is_some())
        .count();
    info!(examples = results.len(), failed, "Prompt test finished");

    Ok(results)
}

//! Critique and revision of a prompt over a whole batch.
//!
//! One critique call per round covers every processed example so that the
//! revision targets patterns shared across examples. Structural mismatch
//! hints computed locally are included in the report to steer the model.

use std::fmt::Write as _;

use tracing::debug;

use super::batch::BatchItem;
use crate::error::{GenerationStage, OptimizerError, OptimizerResult};
use crate::llm::{GenerationResult, TextGenerator};
use crate::prompts::build_critique_prompt;

/// Sampling temperature for critique calls.
pub const CRITIQUE_TEMPERATURE: f64 = 0.3;

/// Token budget for critique calls.
pub const CRITIQUE_MAX_TOKENS: u32 = 500;

/// Diagnostics for a generated/desired pair that differ after trimming.
///
/// The three flags are independent; any combination may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchHints {
    /// Character count of the trimmed generated output.
    pub generated_len: usize,
    /// Character count of the trimmed desired output.
    pub desired_len: usize,
    /// Equal ignoring case.
    pub capitalization: bool,
    /// Equal once single and double quotes are removed.
    pub quotation: bool,
    /// Equal once whitespace is removed.
    pub spacing: bool,
}

/// Compare a generated output with the desired one.
///
/// Returns `None` when they are equal after trimming.
pub fn diagnose_mismatch(generated: &str, desired: &str) -> Option<MismatchHints> {
    let generated = generated.trim();
    let desired = desired.trim();
    if generated == desired {
        return None;
    }

    let strip_quotes = |s: &str| s.chars().filter(|c| *c != '"' && *c != '\'').collect::<String>();
    let strip_spaces = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();

    Some(MismatchHints {
        generated_len: generated.chars().count(),
        desired_len: desired.chars().count(),
        capitalization: generated.to_lowercase() == desired.to_lowercase(),
        quotation: strip_quotes(generated) == strip_quotes(desired),
        spacing: strip_spaces(generated) == strip_spaces(desired),
    })
}

/// Build the per-example comparison report for the processed items.
///
/// Examples are numbered by their position in the batch, so skipped items
/// leave gaps in the numbering.
pub fn build_comparison_report(batch: &[BatchItem]) -> String {
    let mut report = String::new();

    for (idx, item) in batch.iter().enumerate() {
        if !item.is_processed() {
            continue;
        }

        let input = item.input.as_deref().unwrap_or_default();
        let generated = item.generated_output.trim();
        let desired = item.desired_output.as_deref().unwrap_or_default().trim();

        // Writing into a String cannot fail.
        let _ = writeln!(report, "=== Example {} Analysis ===", idx + 1);
        let _ = writeln!(report, "Input: {input}");
        let _ = writeln!(report, "Generated Output: '{generated}'");
        let _ = writeln!(report, "Desired Output:   '{desired}'");

        if let Some(hints) = diagnose_mismatch(generated, desired) {
            report.push_str("MISMATCH DETECTED:\n");
            let _ = writeln!(report, "- Generated length: {} characters", hints.generated_len);
            let _ = writeln!(report, "- Desired length:   {} characters", hints.desired_len);
            if hints.capitalization {
                report.push_str("- CAPITALIZATION ISSUE: Same content, different case\n");
            }
            if hints.quotation {
                report.push_str("- QUOTATION ISSUE: Same content, different quote usage\n");
            }
            if hints.spacing {
                report.push_str("- SPACING ISSUE: Same content, different spacing\n");
            }
        }

        report.push('\n');
    }

    report
}

/// Ask the critique model for a revised prompt.
///
/// Returns the trimmed reply: either the keep sentinel or the full text of a
/// replacement prompt.
pub async fn critique(
    generator: &TextGenerator,
    current_prompt: &str,
    batch: &[BatchItem],
) -> OptimizerResult<String> {
    let report = build_comparison_report(batch);
    let prompt = build_critique_prompt(current_prompt, &report);

    debug!(report_chars = report.len(), "Requesting batch critique");

    match generator
        .generate(
            &prompt.user,
            Some(&prompt.system),
            CRITIQUE_TEMPERATURE,
            CRITIQUE_MAX_TOKENS,
        )
        .await
    {
        GenerationResult::Text(text) => Ok(text.trim().to_string()),
        GenerationResult::Failure(reason) => Err(OptimizerError::generation(
            GenerationStage::BatchAnalysis,
            reason,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::mock::MockLlmProvider;
    use crate::optimizer::batch::BatchStatus;
    use crate::prompts::CRITIQUE_SYSTEM_PROMPT;
    use std::sync::Arc;

    fn processed(input: &str, generated: &str, desired: &str) -> BatchItem {
        BatchItem {
            input: Some(input.to_string()),
            desired_output: Some(desired.to_string()),
            generated_output: generated.to_string(),
            status: BatchStatus::Processed,
        }
    }

    #[test]
    fn test_capitalization_only() {
        let hints = diagnose_mismatch("Hello", "hello").expect("should differ");
        assert!(hints.capitalization);
        assert!(!hints.quotation);
        assert!(!hints.spacing);
        assert_eq!(hints.generated_len, 5);
        assert_eq!(hints.desired_len, 5);
    }

    #[test]
    fn test_quotation_only() {
        let hints = diagnose_mismatch("\"hello\"", "hello").expect("should differ");
        assert!(hints.quotation);
        assert!(!hints.capitalization);
        assert!(!hints.spacing);
        assert_eq!(hints.generated_len, 7);
    }

    #[test]
    fn test_spacing_only() {
        let hints = diagnose_mismatch("a b  c", "abc").expect("should differ");
        assert!(hints.spacing);
        assert!(!hints.capitalization);
        assert!(!hints.quotation);
    }

    #[test]
    fn test_unrelated_outputs_raise_no_flags() {
        let hints = diagnose_mismatch("cat", "dog").expect("should differ");
        assert!(!hints.capitalization && !hints.quotation && !hints.spacing);
    }

    #[test]
    fn test_surrounding_whitespace_is_not_a_mismatch() {
        assert!(diagnose_mismatch("  hello\n", "hello").is_none());
    }

    #[test]
    fn test_length_counts_characters() {
        let hints = diagnose_mismatch("héllo", "hello").expect("should differ");
        assert_eq!(hints.generated_len, 5);
    }

    #[test]
    fn test_report_skips_unprocessed_and_keeps_positions() {
        let batch = vec![
            BatchItem {
                input: None,
                desired_output: Some("x".to_string()),
                generated_output: "SKIPPED - Missing input or output".to_string(),
                status: BatchStatus::Skipped,
            },
            processed("b", "Hello", "hello"),
            processed("c", "same ", "same"),
        ];

        let report = build_comparison_report(&batch);

        assert!(!report.contains("=== Example 1 Analysis ==="));
        assert!(!report.contains("SKIPPED"));
        assert!(report.contains(
            "=== Example 2 Analysis ===\nInput: b\nGenerated Output: 'Hello'\nDesired Output:   'hello'\nMISMATCH DETECTED:\n"
        ));
        assert!(report.contains("- CAPITALIZATION ISSUE: Same content, different case\n"));
        assert!(report.contains(
            "=== Example 3 Analysis ===\nInput: c\nGenerated Output: 'same'\nDesired Output:   'same'\n\n"
        ));
        assert_eq!(report.matches("MISMATCH DETECTED").count(), 1);
    }

    #[tokio::test]
    async fn test_critique_sends_report_and_trims_reply() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Ok(
            "  Echo in uppercase: {{input}}\n".to_string(),
        )]));
        let generator = TextGenerator::with_provider(mock.clone(), "gpt-4o");
        let batch = vec![processed("a", "a", "A")];

        let suggestion = critique(&generator, "Echo: {{input}}", &batch)
            .await
            .expect("critique should succeed");
        assert_eq!(suggestion, "Echo in uppercase: {{input}}");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.temperature, Some(CRITIQUE_TEMPERATURE));
        assert_eq!(request.max_tokens, Some(CRITIQUE_MAX_TOKENS));
        assert_eq!(request.system_content(), Some(CRITIQUE_SYSTEM_PROMPT));
        let user = request.user_content().expect("user message");
        assert!(user.contains("Current Prompt:\nEcho: {{input}}"));
        assert!(user.contains("CAPITALIZATION ISSUE"));
    }

    #[tokio::test]
    async fn test_critique_failure_is_batch_analysis_error() {
        let mock = Arc::new(MockLlmProvider::scripted(vec![Err(LlmError::RateLimited(
            "quota".to_string(),
        ))]));
        let generator = TextGenerator::with_provider(mock, "gpt-4o");

        let err = critique(&generator, "P", &[processed("a", "a", "A")])
            .await
            .expect_err("critique should fail");

        match err {
            OptimizerError::Generation { stage, reason } => {
                assert_eq!(stage, GenerationStage::BatchAnalysis);
                assert!(reason.contains("quota"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

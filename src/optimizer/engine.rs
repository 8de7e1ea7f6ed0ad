//! The optimization loop.
//!
//! Each round runs the current prompt over every example, asks for a batch
//! critique, and either adopts the suggested revision or stops. The loop is
//! a small state machine:
//!
//! ```text
//! Running(i, p) --revised--> Updated(i, p') --> Running(i + 1, p')
//! Running(i, p) --keep/same--> Converged
//! Running(max, p) --> IterationLimitReached
//! ```
//!
//! Every round appends exactly one [`IterationRecord`]; a failed round aborts
//! the run and discards its partial data.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::batch::{run_batch, BatchItem, BatchStatus, Example};
use super::critique::critique;
use crate::error::{OptimizerError, OptimizerResult};
use crate::llm::TextGenerator;
use crate::metrics::MetricsCollector;
use crate::prompts::KEEP_CURRENT_PROMPT;

/// Rounds run when the caller does not specify a limit.
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

/// Outcome of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    Converged,
    Updated,
}

impl IterationStatus {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            IterationStatus::Converged => "converged",
            IterationStatus::Updated => "updated",
        }
    }
}

/// How the critique's reply relates to the prompt it judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The keep sentinel.
    Keep,
    /// A suggestion identical to the current prompt.
    Unchanged,
    /// A distinct replacement prompt.
    Revised,
}

impl Verdict {
    /// Classify a trimmed critique reply against the current prompt.
    pub fn classify(suggestion: &str, current_prompt: &str) -> Self {
        let suggestion = suggestion.trim();
        if suggestion == KEEP_CURRENT_PROMPT {
            Verdict::Keep
        } else if suggestion == current_prompt.trim() {
            Verdict::Unchanged
        } else {
            Verdict::Revised
        }
    }
}

/// Per-round batch statistics and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPerformance {
    /// Number of processed examples.
    pub total_examples: usize,
    /// Number of skipped examples.
    pub skipped_examples: usize,
    /// Every item of the batch, in example order.
    pub examples_details: Vec<BatchItem>,
}

impl BatchPerformance {
    fn from_items(items: Vec<BatchItem>) -> Self {
        let total_examples = items
            .iter()
            .filter(|item| item.status == BatchStatus::Processed)
            .count();
        Self {
            total_examples,
            skipped_examples: items.len() - total_examples,
            examples_details: items,
        }
    }
}

/// Audit record of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Round number, starting at 1.
    pub iteration: usize,
    pub current_prompt_used: String,
    pub analyzer_suggestion: String,
    pub prompt_changed: bool,
    pub batch_performance: BatchPerformance,
    pub summary: String,
    pub status: IterationStatus,
}

impl IterationRecord {
    /// The batch items produced in this round.
    pub fn batch(&self) -> &[BatchItem] {
        &self.batch_performance.examples_details
    }
}

/// Final result of an optimization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_prompt: String,
    pub initial_prompt: String,
    #[serde(rename = "optimizationHistory")]
    pub history: Vec<IterationRecord>,
}

impl OptimizationResult {
    /// Whether the run stopped because the critique signalled convergence.
    pub fn converged(&self) -> bool {
        self.history
            .last()
            .is_some_and(|record| record.status == IterationStatus::Converged)
    }
}

enum LoopState {
    Running { iteration: usize, prompt: String },
    Updated { iteration: usize, prompt: String },
    Converged { prompt: String },
    IterationLimitReached { prompt: String },
}

/// Drives repeated generate/critique rounds for one run.
///
/// A loop borrows the shared generator; the working prompt and history
/// belong to each call of [`OptimizationLoop::run`].
pub struct OptimizationLoop<'a> {
    generator: &'a TextGenerator,
    metrics: MetricsCollector,
}

impl<'a> OptimizationLoop<'a> {
    /// Create a loop over the given generator.
    pub fn new(generator: &'a TextGenerator) -> Self {
        Self {
            generator,
            metrics: MetricsCollector::new(),
        }
    }

    /// Optimize `initial_prompt` against `examples` for at most
    /// `max_iterations` rounds.
    ///
    /// # Errors
    ///
    /// - `Validation` if the prompt or the example list is empty
    /// - `NotConfigured` if the generator has no credential
    /// - `Generation` if any call fails during a round
    pub async fn run(
        &self,
        initial_prompt: &str,
        examples: &[Example],
        max_iterations: usize,
    ) -> OptimizerResult<OptimizationResult> {
        if initial_prompt.is_empty() || examples.is_empty() {
            return Err(OptimizerError::Validation(
                "Missing initialPrompt or examples".to_string(),
            ));
        }
        if !self.generator.is_configured() {
            return Err(OptimizerError::NotConfigured);
        }

        info!(
            examples = examples.len(),
            max_iterations, "Starting prompt optimization"
        );

        match self.drive(initial_prompt, examples, max_iterations).await {
            Ok(result) => Ok(result),
            Err(err) => {
                self.metrics.record_run("failed");
                warn!(error = %err, "Prompt optimization aborted");
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        initial_prompt: &str,
        examples: &[Example],
        max_iterations: usize,
    ) -> OptimizerResult<OptimizationResult> {
        let mut history = Vec::new();
        let mut state = LoopState::Running {
            iteration: 0,
            prompt: initial_prompt.to_string(),
        };

        let optimized_prompt = loop {
            state = match state {
                LoopState::Running { iteration, prompt } if iteration >= max_iterations => {
                    LoopState::IterationLimitReached { prompt }
                }
                LoopState::Running { iteration, prompt } => {
                    let (record, next) = self.run_round(iteration, prompt, examples).await?;
                    history.push(record);
                    next
                }
                LoopState::Updated { iteration, prompt } => LoopState::Running {
                    iteration: iteration + 1,
                    prompt,
                },
                LoopState::Converged { prompt } => {
                    self.metrics.record_run("converged");
                    info!(rounds = history.len(), "Prompt optimization converged");
                    break prompt;
                }
                LoopState::IterationLimitReached { prompt } => {
                    self.metrics.record_run("iteration_limit");
                    info!(
                        rounds = history.len(),
                        "Prompt optimization reached the iteration limit"
                    );
                    break prompt;
                }
            };
        };

        Ok(OptimizationResult {
            optimized_prompt,
            initial_prompt: initial_prompt.to_string(),
            history,
        })
    }

    async fn run_round(
        &self,
        iteration: usize,
        prompt: String,
        examples: &[Example],
    ) -> OptimizerResult<(IterationRecord, LoopState)> {
        let batch = run_batch(self.generator, &prompt, examples).await?;
        let suggestion = critique(self.generator, &prompt, &batch).await?;
        let performance = BatchPerformance::from_items(batch);

        let (status, summary) = match Verdict::classify(&suggestion, &prompt) {
            Verdict::Keep => (
                IterationStatus::Converged,
                "No changes needed - prompt is performing well".to_string(),
            ),
            Verdict::Unchanged => (
                IterationStatus::Converged,
                "Analyzer returned same prompt - no improvements found".to_string(),
            ),
            Verdict::Revised => (
                IterationStatus::Updated,
                format!(
                    "Prompt updated to address issues across {} examples",
                    performance.total_examples
                ),
            ),
        };

        info!(
            iteration = iteration + 1,
            status = status.as_str(),
            processed = performance.total_examples,
            skipped = performance.skipped_examples,
            "Optimization round finished"
        );
        self.metrics.record_round(status.as_str());

        let next = match status {
            IterationStatus::Converged => LoopState::Converged {
                prompt: prompt.clone(),
            },
            IterationStatus::Updated => LoopState::Updated {
                iteration,
                prompt: suggestion.clone(),
            },
        };

        let record = IterationRecord {
            iteration: iteration + 1,
            current_prompt_used: prompt,
            analyzer_suggestion: suggestion,
            prompt_changed: status == IterationStatus::Updated,
            batch_performance: performance,
            summary,
            status,
        };

        Ok((record, next))
    }
}

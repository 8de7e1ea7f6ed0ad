//! High-level recording helpers over the raw Prometheus metrics.
//!
//! Every method is a no-op when `init_metrics()` has not been called, so
//! library users and tests never need to set up a registry.

use super::prometheus::{
    LLM_LATENCY, LLM_REQUESTS_TOTAL, LLM_TOKENS_TOTAL, OPTIMIZATION_ROUNDS_TOTAL,
    OPTIMIZATION_RUNS_TOTAL, SYNTHETIC_EXAMPLES_TOTAL,
};

/// Token usage information for LLM requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    /// Number of input/prompt tokens.
    pub input_tokens: u64,
    /// Number of output/completion tokens.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Create a new TokenUsage instance.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Get the total number of tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Metrics collector for recording prompt-forge operational metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    /// Create a new MetricsCollector instance.
    pub fn new() -> Self {
        Self
    }

    /// Record an LLM API request.
    pub fn record_llm_request(
        &self,
        model: &str,
        success: bool,
        latency_secs: f64,
        tokens: TokenUsage,
    ) {
        let status = if success { "success" } else { "failure" };

        if let Some(llm_requests) = LLM_REQUESTS_TOTAL.get() {
            llm_requests.with_label_values(&[model, status]).inc();
        }

        if let Some(llm_latency) = LLM_LATENCY.get() {
            llm_latency
                .with_label_values(&[model])
                .observe(latency_secs);
        }

        if let Some(llm_tokens) = LLM_TOKENS_TOTAL.get() {
            llm_tokens
                .with_label_values(&[model, "input"])
                .inc_by(tokens.input_tokens as f64);
            llm_tokens
                .with_label_values(&[model, "output"])
                .inc_by(tokens.output_tokens as f64);
        }

        tracing::trace!(
            model = model,
            status = status,
            latency_secs = latency_secs,
            input_tokens = tokens.input_tokens,
            output_tokens = tokens.output_tokens,
            "Recorded LLM request metric"
        );
    }

    /// Record one finished optimization round (`converged` or `updated`).
    pub fn record_round(&self, status: &str) {
        if let Some(rounds) = OPTIMIZATION_ROUNDS_TOTAL.get() {
            rounds.with_label_values(&[status]).inc();
        }
    }

    /// Record the outcome of an optimization run.
    pub fn record_run(&self, outcome: &str) {
        if let Some(runs) = OPTIMIZATION_RUNS_TOTAL.get() {
            runs.with_label_values(&[outcome]).inc();
        }

        tracing::trace!(outcome = outcome, "Recorded optimization run metric");
    }

    /// Record the number of synthetic examples parsed from one generation.
    pub fn record_synthetic_examples(&self, count: usize) {
        if let Some(total) = SYNTHETIC_EXAMPLES_TOTAL.get() {
            total.inc_by(count as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage::new(120, 30);
        assert_eq!(usage.total(), 150);
        assert_eq!(TokenUsage::default().total(), 0);
    }

    #[test]
    fn test_recording_without_init_is_noop() {
        let collector = MetricsCollector::new();
        collector.record_llm_request("gpt-4o", true, 0.4, TokenUsage::new(10, 5));
        collector.record_round("updated");
        collector.record_run("converged");
        collector.record_synthetic_examples(3);
    }
}

//! Prometheus metrics registration and export.
//!
//! This module defines all Prometheus metrics used by prompt-forge and
//! provides functions for initializing, registering, and exporting metrics.

use prometheus::{Counter, CounterVec, Encoder, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all prompt-forge metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Total LLM API requests, labeled by model and status.
pub static LLM_REQUESTS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// LLM API request latency in seconds, labeled by model.
pub static LLM_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Total tokens used, labeled by model and type (input/output).
pub static LLM_TOKENS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Optimization rounds completed, labeled by round status.
pub static OPTIMIZATION_ROUNDS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Optimization runs finished, labeled by outcome.
pub static OPTIMIZATION_RUNS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Synthetic examples successfully parsed from generation output.
pub static SYNTHETIC_EXAMPLES_TOTAL: OnceLock<Counter> = OnceLock::new();

/// Initialize all metrics and register them with the registry.
///
/// Call once at application startup. Calling it again is harmless: the
/// first registration wins.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let registry = Registry::new();

    // LLM metrics
    let llm_requests_total = CounterVec::new(
        Opts::new("prompt_forge_llm_requests_total", "Total LLM API requests"),
        &["model", "status"],
    )?;

    let llm_latency = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "prompt_forge_llm_latency_seconds",
            "LLM API request latency in seconds",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["model"],
    )?;

    let llm_tokens_total = CounterVec::new(
        Opts::new("prompt_forge_llm_tokens_total", "Total tokens used"),
        &["model", "type"],
    )?;

    // Optimizer metrics
    let optimization_rounds_total = CounterVec::new(
        Opts::new(
            "prompt_forge_optimization_rounds_total",
            "Optimization rounds completed",
        ),
        &["status"],
    )?;

    let optimization_runs_total = CounterVec::new(
        Opts::new(
            "prompt_forge_optimization_runs_total",
            "Optimization runs finished",
        ),
        &["outcome"],
    )?;

    let synthetic_examples_total = Counter::new(
        "prompt_forge_synthetic_examples_total",
        "Synthetic examples parsed from generation output",
    )?;

    registry.register(Box::new(llm_requests_total.clone()))?;
    registry.register(Box::new(llm_latency.clone()))?;
    registry.register(Box::new(llm_tokens_total.clone()))?;
    registry.register(Box::new(optimization_rounds_total.clone()))?;
    registry.register(Box::new(optimization_runs_total.clone()))?;
    registry.register(Box::new(synthetic_examples_total.clone()))?;

    // If any of these fail, metrics were already initialized (idempotent)
    let _ = REGISTRY.set(registry);
    let _ = LLM_REQUESTS_TOTAL.set(llm_requests_total);
    let _ = LLM_LATENCY.set(llm_latency);
    let _ = LLM_TOKENS_TOTAL.set(llm_tokens_total);
    let _ = OPTIMIZATION_ROUNDS_TOTAL.set(optimization_rounds_total);
    let _ = OPTIMIZATION_RUNS_TOTAL.set(optimization_runs_total);
    let _ = SYNTHETIC_EXAMPLES_TOTAL.set(synthetic_examples_total);

    tracing::info!("Prometheus metrics initialized successfully");

    Ok(())
}

/// Export all registered metrics in Prometheus text format.
///
/// If the registry has not been initialized or encoding fails, returns a
/// comment line describing the problem instead.
pub fn export_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return "# Metrics not initialized. Call init_metrics() first.\n".to_string();
    };

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}\n", e);
    }

    String::from_utf8(buffer)
        .unwrap_or_else(|e| format!("# Error converting metrics to UTF-8: {}\n", e))
}

/// HTTP handler for the /metrics endpoint.
pub async fn metrics_handler() -> String {
    export_metrics()
}

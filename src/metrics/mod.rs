//! Metrics module for Prometheus-based monitoring.
//!
//! Tracks LLM usage, optimization rounds and synthetic example output.
//!
//! # Example
//!
//! ```ignore
//! use prompt_forge::metrics::{init_metrics, export_metrics, MetricsCollector};
//!
//! init_metrics().expect("Failed to initialize metrics");
//!
//! let collector = MetricsCollector::new();
//! collector.record_round("updated");
//!
//! let metrics_text = export_metrics();
//! ```

pub mod collectors;
pub mod prometheus;

pub use collectors::{MetricsCollector, TokenUsage};
pub use prometheus::{export_metrics, init_metrics, metrics_handler};

pub use prometheus::{
    LLM_LATENCY, LLM_REQUESTS_TOTAL, LLM_TOKENS_TOTAL, OPTIMIZATION_ROUNDS_TOTAL,
    OPTIMIZATION_RUNS_TOTAL, REGISTRY, SYNTHETIC_EXAMPLES_TOTAL,
};

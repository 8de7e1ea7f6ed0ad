//! prompt-forge: iterative prompt optimization against example sets.
//!
//! This library runs a prompt over desired input/output examples, critiques
//! the results in one batch, and revises the prompt until it converges or an
//! iteration limit is reached. It also generates synthetic examples and
//! serves everything over HTTP.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod optimizer;
pub mod prompts;

pub use config::{ConfigError, LlmConfig, ServerConfig};
pub use error::{GenerationStage, LlmError, OptimizerError, OptimizerResult};

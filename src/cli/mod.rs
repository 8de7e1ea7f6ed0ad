//! Command-line interface for prompt-forge.
//!
//! Provides the HTTP server command and local one-shot commands for
//! optimization, synthetic example generation, prompt testing and key checks.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};

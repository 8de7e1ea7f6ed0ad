//! Prompt optimization.
//!
//! - [`template`] - placeholder substitution
//! - [`batch`] - running a prompt over an example set
//! - [`critique`] - batch critique and mismatch diagnostics
//! - [`engine`] - the iterative optimization loop
//! - [`synthetic`] - synthetic example generation
//! - [`key_check`] - credential probe

pub mod batch;
pub mod critique;
pub mod engine;
pub mod key_check;
pub mod synthetic;
pub mod template;

pub use batch::{run_batch, test_prompt, BatchItem, BatchStatus, Example, PromptTestResult};
pub use critique::{build_comparison_report, critique, diagnose_mismatch, MismatchHints};
pub use engine::{
    BatchPerformance, IterationRecord, IterationStatus, OptimizationLoop, OptimizationResult,
    Verdict, DEFAULT_MAX_ITERATIONS,
};
pub use key_check::{check_key, KeyCheck};
pub use synthetic::{
    generate_examples, parse_synthetic_examples, SyntheticExample, SyntheticGeneration,
    DEFAULT_NUM_TO_GENERATE,
};
pub use template::{render, INPUT_PLACEHOLDER};

//! LLM prompts used by the optimizer.
//!
//! - [`critique`] - the batch critique that proposes prompt revisions
//! - [`synthetic`] - synthetic example generation

pub mod critique;
pub mod synthetic;

pub use critique::{build_critique_prompt, CritiquePrompt, CRITIQUE_SYSTEM_PROMPT, KEEP_CURRENT_PROMPT};
pub use synthetic::{build_synthetic_prompt, SYNTHETIC_SYSTEM_PROMPT};

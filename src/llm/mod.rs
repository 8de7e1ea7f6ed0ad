//! LLM integration for prompt-forge.
//!
//! The optimizer talks to models only through [`TextGenerator`], which
//! wraps an [`LlmProvider`] and reports each call as a
//! [`GenerationResult`]. The bundled provider is an OpenAI-compatible
//! chat completions client.
//!
//! ```ignore
//! use prompt_forge::config::LlmConfig;
//! use prompt_forge::llm::{GenerationResult, TextGenerator};
//!
//! let generator = TextGenerator::from_config(&LlmConfig::from_env()?)?;
//! match generator.generate("Say hi", None, 0.7, 20).await {
//!     GenerationResult::Text(text) => println!("{text}"),
//!     GenerationResult::Failure(reason) => eprintln!("{reason}"),
//! }
//! ```

pub mod generator;
pub mod openai;

#[cfg(test)]
pub(crate) mod mock;

pub use generator::{GenerationResult, TextGenerator, DEFAULT_TEMPERATURE, NOT_CONFIGURED_REASON};
pub use openai::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, OpenAiClient, Usage,
};

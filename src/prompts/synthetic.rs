//! Prompt builder for synthetic example generation.

/// System prompt for synthetic example generation.
pub const SYNTHETIC_SYSTEM_PROMPT: &str = "You are an AI assistant that generates synthetic examples based on a provided set. Ensure the examples are diverse and follow the implicit pattern.";

/// Build the user prompt asking for `count` new input/output pairs.
///
/// `examples_block` is the seed examples already rendered as
/// `Input: ...\nOutput: ...\n\n` entries.
pub fn build_synthetic_prompt(examples_block: &str, count: usize) -> String {
    format!(
        "Here are some examples of inputs and outputs:\n\n{examples_block}\
         Based on these examples, generate {count} new, distinct input-output pairs that follow the same pattern. \
         Format each new pair as:\nInput: [new input]\nOutput: [new output]\n\n\
         Ensure the generated examples are different from the provided ones and from each other."
    )
}

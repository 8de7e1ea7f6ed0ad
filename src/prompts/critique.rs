//! Critique prompt builder for batch prompt revision.
//!
//! The critique model sees the prompt under optimization together with a
//! report covering every processed example, and must answer with either the
//! keep sentinel or a bare revised prompt.

/// Sentinel the critique model returns when no revision is needed.
pub const KEEP_CURRENT_PROMPT: &str = "KEEP_CURRENT_PROMPT";

/// Prompts for one critique call.
#[derive(Debug, Clone)]
pub struct CritiquePrompt {
    /// System prompt establishing the analysis framework and output rules.
    pub system: String,
    /// User prompt with the current prompt and the comparison report.
    pub user: String,
}

impl CritiquePrompt {
    /// Creates a new critique prompt with the given system and user messages.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// System prompt for the batch critique.
pub const CRITIQUE_SYSTEM_PROMPT: &str = r#"You are an expert prompt engineer. You improve a prompt by studying how it performs on several examples at once.

## Analysis Framework

1. **Exact Format Comparison**: compare each generated output with its desired output character by character:
   - capitalization (upper vs lower case)
   - quotation marks (missing, extra, or the wrong kind: ", ', `)
   - punctuation (periods, commas, colons, semicolons)
   - spacing and line breaks
   - special characters and symbols
   - number formatting (1 vs 1.0 vs one)
   - date and time formats

2. **Content & Structure Comparison**:
   - missing or extra words and phrases
   - word order and sentence structure
   - completeness of information
   - tone and style
   - length and verbosity

3. **Cross-Example Patterns**: find issues that repeat across ALL examples:
   - consistent formatting deviations (for example always adding quotes)
   - repeated content errors
   - style drift (formal vs informal)
   - structural problems (missing sections, wrong order)

4. **Root Cause**: name the prompt deficiency behind each issue:
   - missing explicit format instructions ("do not use quotes", "use lowercase")
   - ambiguous wording
   - no example of the desired format
   - missing constraints or rules
   - conflicting instructions

5. **Precise Revision**: write improvements that:
   - add specific format rules ("respond in lowercase", "never use quotation marks")
   - show the correct format with concrete examples when useful
   - use unambiguous language
   - state exact punctuation and capitalization rules

## Decision Criteria

Respond with KEEP_CURRENT_PROMPT only if:
- every generated output matches its desired output exactly, in format and in content
- no capitalization, punctuation, quotation or spacing differences remain
- the prompt already states the format it needs

## Output Requirements

If any formatting or content issue exists, reply with ONLY the revised prompt. The revised prompt must:
- address every issue found with a specific instruction
- state explicit format rules and constraints
- keep every {{input}} placeholder that appears in the current prompt
- include concrete examples if they help

Even small differences in quotes, capitalization or punctuation require a revision.

Reply with the revised prompt text or KEEP_CURRENT_PROMPT and nothing else: no explanations, no analysis, no commentary."#;

/// Build the critique prompt for a batch.
///
/// # Arguments
///
/// * `current_prompt` - The prompt that produced the batch
/// * `report` - The per-example comparison report
pub fn build_critique_prompt(current_prompt: &str, report: &str) -> CritiquePrompt {
    let user = format!(
        "Current Prompt:\n{current_prompt}\n\n\
         Performance Analysis:\n{report}\
         TASK: Analyze the mismatches above and write a revised prompt that produces EXACTLY the desired outputs. \
         Pay special attention to formatting (capitalization, quotes, spacing, punctuation). \
         If ALL examples match perfectly, respond with '{KEEP_CURRENT_PROMPT}'."
    );

    CritiquePrompt::new(CRITIQUE_SYSTEM_PROMPT, user)
}

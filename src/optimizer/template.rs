//! Placeholder substitution for prompt templates.

/// Marker replaced by the example input.
pub const INPUT_PLACEHOLDER: &str = "{{input}}";

/// Render a prompt template for one example input.
///
/// Every occurrence of `{{input}}` is replaced by `input`. A template without
/// the marker gets an explicit completion framing appended instead.
pub fn render(template: &str, input: &str) -> String {
    if template.contains(INPUT_PLACEHOLDER) {
        template.replace(INPUT_PLACEHOLDER, input)
    } else {
        format!("{template}\n\nInput: {input}\nOutput:")
    }
}

//! Integration tests against a live OpenAI-compatible API.
//!
//! Run with: OPENAI_API_KEY=your_key cargo test --test llm_integration -- --ignored

use prompt_forge::config::LlmConfig;
use prompt_forge::llm::{GenerationRequest, LlmProvider, Message, OpenAiClient, TextGenerator};
use prompt_forge::optimizer::{
    check_key, generate_examples, test_prompt, Example, OptimizationLoop,
};

fn live_config() -> LlmConfig {
    let config = LlmConfig::from_env().expect("valid OPENAI_* environment");
    assert!(
        config.has_api_key(),
        "OPENAI_API_KEY environment variable must be set for integration tests"
    );
    config
}

fn live_generator() -> TextGenerator {
    TextGenerator::from_config(&live_config()).expect("client should build")
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_simple_generation() {
    let config = live_config();
    let client = OpenAiClient::from_config(&config).expect("client should build");

    let request = GenerationRequest::new(
        config.model.clone(),
        vec![
            Message::system("You are a helpful assistant. Reply concisely."),
            Message::user("What is 2 + 2? Reply with just the number."),
        ],
    )
    .with_max_tokens(10)
    .with_temperature(0.0);

    let response = client.generate(request).await;
    assert!(response.is_ok(), "Generation failed: {:?}", response.err());

    let response = response.expect("Should have response");
    let content = response.first_content().expect("Should have content");
    assert!(content.contains('4'), "Response should contain '4', got: {}", content);
    assert!(response.usage.total_tokens > 0, "Should have token usage");
}

#[tokio::test]
#[ignore]
async fn test_key_check() {
    let check = check_key(&live_generator()).await;
    assert!(check.success, "key check failed: {}", check.message);
    assert!(check.response.is_some());
}

#[tokio::test]
async fn test_invalid_api_key() {
    let config = LlmConfig::new()
        .with_api_key("invalid-key-12345")
        .with_api_base("http://127.0.0.1:9/v1");
    let generator = TextGenerator::from_config(&config).expect("client should build");

    let check = check_key(&generator).await;
    assert!(!check.success);
    assert!(check.message.starts_with("OpenAI API call failed:"));
}

#[tokio::test]
#[ignore]
async fn test_prompt_run() {
    let generator = live_generator();
    let examples = vec![Example::new("hello", "HELLO"), Example::new("rust", "RUST")];

    let results = test_prompt(
        &generator,
        "Convert the text to uppercase. Reply with the converted text only: {{input}}",
        &examples,
    )
    .await
    .expect("prompt test should run");

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.error_detail.is_none()));
}

#[tokio::test]
#[ignore]
async fn test_synthetic_examples() {
    let generator = live_generator();
    let seeds = vec![Example::new("cat", "CAT"), Example::new("dog", "DOG")];

    let generation = generate_examples(&generator, &seeds, 3)
        .await
        .expect("generation should succeed");

    assert!(
        !generation.generated_examples.is_empty(),
        "expected at least one parsed pair"
    );
}

#[tokio::test]
#[ignore]
async fn test_optimization_run() {
    let generator = live_generator();
    let examples = vec![
        Example::new("hello world", "HELLO WORLD"),
        Example::new("good morning", "GOOD MORNING"),
    ];

    let result = OptimizationLoop::new(&generator)
        .run("Repeat the text: {{input}}", &examples, 2)
        .await
        .expect("optimization should run");

    assert!(!result.history.is_empty());
    assert!(result.history.len() <= 2);
    assert_eq!(result.history[0].current_prompt_used, "Repeat the text: {{input}}");
}

use crate::config::{Config, ImageConfig, LLMConfig, LLMProvider, QueueConfig, SearchConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.output_path, PathBuf::from("./deepresearch.out"));
    assert!(!config.verbose);
}

#[test]
fn test_llm_provider_default() {
    let provider = LLMProvider::default();
    assert_eq!(provider, LLMProvider::OpenAI);
}

#[test]
fn test_llm_provider_from_str() {
    assert_eq!(
        "openai".parse::<LLMProvider>().unwrap(),
        LLMProvider::OpenAI
    );
    assert_eq!(
        "anthropic".parse::<LLMProvider>().unwrap(),
        LLMProvider::Anthropic
    );
    assert_eq!(
        "openrouter".parse::<LLMProvider>().unwrap(),
        LLMProvider::OpenRouter
    );
    assert_eq!(
        "ollama".parse::<LLMProvider>().unwrap(),
        LLMProvider::Ollama
    );

    assert!("invalid".parse::<LLMProvider>().is_err());
}

#[test]
fn test_llm_provider_display() {
    assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
    assert_eq!(LLMProvider::Anthropic.to_string(), "anthropic");
    assert_eq!(LLMProvider::OpenRouter.to_string(), "openrouter");
    assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
}

#[test]
fn test_llm_config_default() {
    let config = LLMConfig::default();

    assert_eq!(config.provider, LLMProvider::OpenAI);
    // api_key may be empty if env var is not set
    assert!(!config.api_base_url.is_empty());
    assert!(!config.model_efficient.is_empty());
    assert!(!config.model_powerful.is_empty());
    assert_eq!(config.max_tokens, 131072);
    assert_eq!(config.temperature, 0.1);
    assert_eq!(config.retry_attempts, 5);
    assert_eq!(config.retry_base_delay_ms, 2000);
    assert_eq!(config.retry_base_delay(), Duration::from_millis(2000));
    assert_eq!(config.timeout_seconds, 300);
    assert_eq!(config.max_parallels, 3);
}

#[test]
fn test_search_config_default() {
    let config = SearchConfig::default();

    assert!(!config.api_base_url.is_empty());
    assert_eq!(config.max_results, 15);
    assert!(!config.deepen_pages);
    assert_eq!(config.excerpt_limit, 4000);
}

#[test]
fn test_image_config_default() {
    let config = ImageConfig::default();

    assert!(config.enabled);
    assert!(!config.api_base_url.is_empty());
}

#[test]
fn test_queue_config_default() {
    let config = QueueConfig::default();

    assert_eq!(config.inter_job_delay_ms, 2000);
    assert_eq!(config.inter_job_delay(), Duration::from_millis(2000));
}

#[test]
fn test_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("deepresearch.toml");

    let config_content = r#"output_path = "./reports"
verbose = true

[llm]
provider = "anthropic"
api_key = "test-key"
api_base_url = "https://example.com/v1"
model_efficient = "model-a"
model_powerful = "model-b"
max_tokens = 4096
temperature = 0.2
retry_attempts = 3
retry_base_delay_ms = 500
timeout_seconds = 60
max_parallels = 2

[search]
api_key = "search-key"
api_base_url = "https://search.example.com"
max_results = 5
deepen_pages = true
excerpt_limit = 2000

[images]
enabled = false
api_key = ""
api_base_url = "https://images.example.com"

[queue]
inter_job_delay_ms = 100
"#;

    std::fs::write(&config_path, config_content).unwrap();

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.output_path, PathBuf::from("./reports"));
    assert!(config.verbose);
    assert_eq!(config.llm.provider, LLMProvider::Anthropic);
    assert_eq!(config.llm.retry_attempts, 3);
    assert_eq!(config.search.max_results, 5);
    assert!(config.search.deepen_pages);
    assert!(!config.images.enabled);
    assert_eq!(config.queue.inter_job_delay_ms, 100);
}

#[test]
fn test_config_from_missing_file() {
    let path = PathBuf::from("/nonexistent/deepresearch.toml");
    assert!(Config::from_file(&path).is_err());
}

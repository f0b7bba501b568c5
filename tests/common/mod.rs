/*!
 * Common test utilities for the subctx test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

use subctx::Config;
use subctx::providers::{ApiClient, CacheMode, RetryMode};

/// Chat completions path served by the mock server
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// Responses path derived from `CHAT_PATH`
pub const RESPONSES_PATH: &str = "/v1/responses";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains
multiple lines.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
"#;
    create_test_file(dir, filename, content)
}

/// Chat completions success body
pub fn chat_body(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

/// Responses endpoint success body
pub fn responses_body(text: &str) -> Value {
    json!({
        "id": "resp-test",
        "output": [{
            "type": "message",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text}]
        }]
    })
}

/// Chat URL on the mock server
pub fn chat_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), CHAT_PATH)
}

/// Client pointed at the mock server, chat only, no delay
pub fn chat_client(server: &MockServer, retry_mode: RetryMode) -> ApiClient {
    ApiClient::new(chat_url(server), "sk-test", "gpt-5-nano")
        .retry_policy(retry_mode, std::time::Duration::ZERO)
        .cache_mode(CacheMode::Off)
}

/// Config pointed at the mock server
pub fn test_config(server: &MockServer, target_language: &str) -> Config {
    let mut config = Config::default();
    config.api_url = chat_url(server);
    config.api_key = "sk-test".to_string();
    config.target_language = target_language.to_string();
    config
}

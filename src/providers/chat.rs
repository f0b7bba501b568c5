/*!
 * Baseline chat completions protocol.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ApiError, ApiErrorKind};

use super::client::{ApiClient, MAX_OUTPUT_TOKENS, RetryScope};

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,

    /// Maximum number of tokens to generate
    max_tokens: u32,

    /// Temperature for generation
    temperature: f32,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    #[serde(default)]
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completions response; fields are optional so each missing piece maps to its own error
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<ChatChoice>>,
}

/// Individual choice in a chat response
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: 0.0,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Pull the first choice's content out of a chat response.
pub fn extract_chat_content(response: &Value) -> Result<String, ApiError> {
    let parsed: ChatResponse = serde_json::from_value(response.clone()).map_err(|_| {
        ApiError::new(
            ApiErrorKind::MalformedResponse,
            "Malformed response: missing 'choices' field",
        )
        .with_payload(response.clone())
    })?;

    let choices = parsed.choices.ok_or_else(|| {
        ApiError::new(
            ApiErrorKind::MalformedResponse,
            "Malformed response: missing 'choices' field",
        )
        .with_payload(response.clone())
    })?;

    let first = choices.into_iter().next().ok_or_else(|| {
        ApiError::new(ApiErrorKind::EmptyResponse, "Empty response from the translation API")
            .with_payload(response.clone())
    })?;

    first
        .message
        .and_then(|m| m.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            ApiError::new(ApiErrorKind::NoContent, "Translation API returned no content")
                .with_payload(response.clone())
        })
}

impl ApiClient {
    /// Translate through the baseline `/chat/completions` endpoint
    pub async fn translate_chat(&self, system_message: &str, user_message: &str) -> Result<String, ApiError> {
        let request = ChatRequest::new(self.model.clone())
            .add_message("system", system_message)
            .add_message("user", user_message)
            .temperature(self.temperature);

        let response = self.request_with_retry(&self.api_url, &request, RetryScope::AnyFailure).await?;
        extract_chat_content(&response)
    }
}

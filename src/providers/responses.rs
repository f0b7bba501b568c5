/*!
 * Caching-optimised responses protocol.
 *
 * The system prompt, the instruction block and every context entry are
 * marked cacheable so providers that support prompt caching can reuse the
 * stable prefix between consecutive subtitle lines. Only the line being
 * translated is sent uncached.
 */

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;
use crate::translation::prompts::{context_entry_text, subtitle_part_text};

use super::client::{ApiClient, MAX_OUTPUT_TOKENS, RetryScope};

const RESPONSES_PATH: &str = "/responses";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Whether the caching endpoint may be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Try the caching endpoint first
    #[default]
    Auto,
    /// Chat endpoint only
    Off,
}

impl CacheMode {
    pub fn is_enabled(self) -> bool {
        self == Self::Auto
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Off => write!(f, "off"),
        }
    }
}

impl FromStr for CacheMode {
    type Err = String;

    /// Accepts `auto` plus the aliases `off`, `disable`, `disabled` and `chat`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "off" | "disable" | "disabled" | "chat" => Ok(Self::Off),
            other => Err(format!("unknown cache mode: {}", other)),
        }
    }
}

/// Cache marker attached to reusable input parts
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheControl {
    #[serde(rename = "type")]
    pub control_type: &'static str,
}

impl CacheControl {
    pub fn ephemeral() -> Self {
        Self { control_type: "ephemeral" }
    }
}

/// One `input_text` part
#[derive(Debug, Clone, Serialize)]
pub struct InputPart {
    #[serde(rename = "type")]
    pub part_type: &'static str,

    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

impl InputPart {
    pub fn cached(text: impl Into<String>) -> Self {
        Self {
            part_type: "input_text",
            text: text.into(),
            cache_control: Some(CacheControl::ephemeral()),
        }
    }

    pub fn uncached(text: impl Into<String>) -> Self {
        Self {
            part_type: "input_text",
            text: text.into(),
            cache_control: None,
        }
    }
}

/// A role-tagged list of input parts
#[derive(Debug, Serialize)]
pub struct InputMessage {
    pub role: &'static str,
    pub content: Vec<InputPart>,
}

/// Request body for the responses endpoint
#[derive(Debug, Serialize)]
pub struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    max_output_tokens: u32,
    temperature: f32,
}

impl ResponsesRequest {
    /// Build the multi-part payload: cached system prompt, cached instruction,
    /// one cached part per context segment, then the uncached subtitle.
    pub fn new(
        model: impl Into<String>,
        system_message: &str,
        instruction: &str,
        context_segments: &[String],
        subtitle_text: &str,
        temperature: f32,
    ) -> Self {
        let mut user_parts = Vec::with_capacity(context_segments.len() + 2);
        user_parts.push(InputPart::cached(instruction));
        user_parts.extend(
            context_segments
                .iter()
                .map(|segment| InputPart::cached(context_entry_text(segment))),
        );
        user_parts.push(InputPart::uncached(subtitle_part_text(subtitle_text)));

        Self {
            model: model.into(),
            input: vec![
                InputMessage {
                    role: "system",
                    content: vec![InputPart::cached(system_message)],
                },
                InputMessage {
                    role: "user",
                    content: user_parts,
                },
            ],
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature,
        }
    }
}

/// Derive the responses URL from a chat completions URL.
///
/// Returns `None` when there is nothing to derive from.
pub fn derive_responses_url(api_url: &str) -> Option<String> {
    let url = api_url.trim().trim_end_matches('/');
    if url.is_empty() {
        return None;
    }
    if url.contains(RESPONSES_PATH) {
        return Some(url.to_string());
    }
    if url.contains(CHAT_COMPLETIONS_PATH) {
        return Some(url.replace(CHAT_COMPLETIONS_PATH, RESPONSES_PATH));
    }
    Some(format!("{}{}", url, RESPONSES_PATH))
}

/// First text part of the first output entry that has one.
///
/// `None` means the body is not in the responses shape.
pub fn extract_output_text(response: &Value) -> Option<String> {
    let output = response.get("output")?.as_array()?;

    for entry in output.iter().filter_map(Value::as_object) {
        let Some(parts) = entry.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in parts {
            match part {
                Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("output_text") => {
                    if let Some(text) = obj.get("text").and_then(Value::as_str) {
                        if !text.is_empty() {
                            return Some(text.to_string());
                        }
                    }
                }
                Value::String(text) => return Some(text.clone()),
                _ => {}
            }
        }
    }
    None
}

impl ApiClient {
    /// Translate through the caching `/responses` endpoint.
    ///
    /// Returns `Ok(None)` when caching is off, no URL can be derived, or the
    /// reply is not in the responses shape. HTTP error statuses are not
    /// retried here: a provider without `/responses` must reach the chat
    /// fallback even under the unbounded retry modes.
    pub async fn translate_responses(
        &self,
        system_message: &str,
        instruction: &str,
        context_segments: &[String],
        subtitle_text: &str,
    ) -> Result<Option<String>, ApiError> {
        if !self.cache_mode.is_enabled() {
            return Ok(None);
        }
        let Some(url) = derive_responses_url(&self.api_url) else {
            return Ok(None);
        };

        let request = ResponsesRequest::new(
            self.model.clone(),
            system_message,
            instruction,
            context_segments,
            subtitle_text,
            self.temperature,
        );

        let response = self.request_with_retry(&url, &request, RetryScope::TransportOnly).await?;
        let text = extract_output_text(&response);
        if text.is_none() {
            debug!("Responses endpoint returned an unexpected shape");
        }
        Ok(text)
    }
}

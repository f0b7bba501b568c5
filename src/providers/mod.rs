/*!
 * Client for chat-completion style translation endpoints.
 *
 * This module contains the HTTP side of the pipeline:
 * - `client`: shared HTTP client, retry policy and error normalisation
 * - `chat`: the baseline `/chat/completions` protocol
 * - `responses`: the caching-optimised `/responses` protocol
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ApiError;

/// The two endpoint shapes a translator can call.
///
/// Implemented by [`client::ApiClient`] for real HTTP traffic; tests swap in
/// scripted implementations.
#[async_trait]
pub trait TranslationEndpoint: Send + Sync + Debug {
    /// Translate through the baseline chat endpoint
    ///
    /// # Returns
    /// * `Result<String, ApiError>` - The message content of the first choice
    async fn translate_chat(&self, system_message: &str, user_message: &str) -> Result<String, ApiError>;

    /// Translate through the caching endpoint
    ///
    /// # Returns
    /// * `Ok(Some(text))` - The first output text
    /// * `Ok(None)` - The endpoint is disabled, not derivable, or answered in another shape
    /// * `Err(ApiError)` - The request failed after retries
    async fn translate_responses(
        &self,
        system_message: &str,
        instruction: &str,
        context_segments: &[String],
        subtitle_text: &str,
    ) -> Result<Option<String>, ApiError>;
}

pub mod chat;
pub mod client;
pub mod responses;

pub use client::{ApiClient, RetryMode, RetryScope};
pub use responses::CacheMode;

#[async_trait]
impl TranslationEndpoint for ApiClient {
    async fn translate_chat(&self, system_message: &str, user_message: &str) -> Result<String, ApiError> {
        ApiClient::translate_chat(self, system_message, user_message).await
    }

    async fn translate_responses(
        &self,
        system_message: &str,
        instruction: &str,
        context_segments: &[String],
        subtitle_text: &str,
    ) -> Result<Option<String>, ApiError> {
        ApiClient::translate_responses(self, system_message, instruction, context_segments, subtitle_text).await
    }
}

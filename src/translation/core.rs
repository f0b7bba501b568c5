/*!
 * Core translation service implementation.
 *
 * `SubtitleTranslator` is the stateful coordinator for one translation
 * session. It owns the dialogue history, the context window policy and the
 * endpoint client, and decides per line whether the caching endpoint is
 * still worth trying.
 */

use log::{debug, warn};

use crate::app_config::Config;
use crate::errors::ApiError;
use crate::language_utils::is_rtl_language;
use crate::providers::{ApiClient, CacheMode, TranslationEndpoint};

use super::context::{ContextWindow, SubtitleHistory};
use super::prompts::{PromptTemplate, SYSTEM_PROMPT, TranslationPromptBuilder, language_label};

/// Right-to-left embedding mark prepended for RTL target languages
pub const RTL_EMBEDDING: char = '\u{202B}';

/// A translated line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// Source line as submitted
    pub original: String,

    /// Trimmed translation
    pub translated: String,
}

/// Which endpoints the session still uses.
///
/// Moves from `TryCached` to `ChatOnly` on the first caching failure and
/// never moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// Try the caching endpoint, fall back to chat
    TryCached,
    /// Chat endpoint only
    ChatOnly,
}

/// Per-session settings the translator reads on every call
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Source language code, empty for auto detection
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Context selection policy
    pub context_window: ContextWindow,

    /// Whether the caching endpoint may be used at all
    pub cache_mode: CacheMode,

    /// Token ceiling of the configured model
    pub max_model_tokens: usize,
}

impl TranslatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            context_window: ContextWindow::new(config.context_token_budget, config.context_truncation_mode),
            cache_mode: config.context_cache_mode,
            max_model_tokens: config.model_token_limits.max_tokens_for(&config.model),
        }
    }
}

/// Counters for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Lines translated successfully
    pub lines: usize,

    /// Lines answered by the caching endpoint
    pub cached_endpoint: usize,

    /// Lines answered by the chat endpoint
    pub chat_endpoint: usize,
}

impl TranslationStats {
    /// Generate a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} line(s) translated ({} via responses endpoint, {} via chat endpoint)",
            self.lines, self.cached_endpoint, self.chat_endpoint
        )
    }
}

/// Contextual subtitle translator for one session.
///
/// Calls must not overlap: each line is fully translated, including
/// retries, before the next begins.
#[derive(Debug)]
pub struct SubtitleTranslator<E: TranslationEndpoint = ApiClient> {
    endpoint: E,
    options: TranslatorOptions,
    history: SubtitleHistory,
    endpoint_state: EndpointState,
    stats: TranslationStats,
}

impl SubtitleTranslator<ApiClient> {
    /// Create a translator talking to the endpoint described by `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(ApiClient::from_config(config), TranslatorOptions::from_config(config))
    }
}

impl<E: TranslationEndpoint> SubtitleTranslator<E> {
    pub fn new(endpoint: E, options: TranslatorOptions) -> Self {
        let endpoint_state = if options.cache_mode.is_enabled() {
            EndpointState::TryCached
        } else {
            EndpointState::ChatOnly
        };

        Self {
            endpoint,
            options,
            history: SubtitleHistory::new(),
            endpoint_state,
            stats: TranslationStats::default(),
        }
    }

    pub fn endpoint_state(&self) -> EndpointState {
        self.endpoint_state
    }

    pub fn history(&self) -> &SubtitleHistory {
        &self.history
    }

    pub fn stats(&self) -> &TranslationStats {
        &self.stats
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Translate one dialogue line using the recent history as context.
    pub async fn translate(&mut self, subtitle: &str) -> Result<TranslationResult, ApiError> {
        self.history.add(subtitle);
        let window = self.options.context_window;
        let segments = window.build_segments(&self.history, subtitle, self.options.max_model_tokens);
        window.shrink_history(&mut self.history);

        let source_label = language_label(&self.options.source_language);
        let target_label = language_label(&self.options.target_language);

        let user_prompt = TranslationPromptBuilder::new(source_label, target_label)
            .with_context(&segments)
            .build(subtitle);
        let instruction = PromptTemplate::cache_instruction().render(source_label, target_label);

        let mut translation = None;
        if self.endpoint_state == EndpointState::TryCached {
            match self
                .endpoint
                .translate_responses(SYSTEM_PROMPT, &instruction, &segments, subtitle)
                .await
            {
                Ok(Some(text)) => {
                    self.stats.cached_endpoint += 1;
                    translation = Some(text);
                }
                Ok(None) => self.disable_cached_endpoint("unexpected response shape"),
                Err(err) => self.disable_cached_endpoint(&err.message),
            }
        }

        let translation = match translation {
            Some(text) => text,
            None => {
                debug!("Translating via chat endpoint");
                let text = self.endpoint.translate_chat(SYSTEM_PROMPT, &user_prompt).await?;
                self.stats.chat_endpoint += 1;
                text
            }
        };

        let mut translated = translation.trim().to_string();
        if is_rtl_language(&self.options.target_language) {
            translated.insert(0, RTL_EMBEDDING);
        }

        self.stats.lines += 1;
        Ok(TranslationResult {
            original: subtitle.to_string(),
            translated,
        })
    }

    fn disable_cached_endpoint(&mut self, reason: &str) {
        warn!("Responses endpoint unavailable ({}); using chat completions for the rest of the session", reason);
        self.endpoint_state = EndpointState::ChatOnly;
    }
}

/*!
 * Contextual subtitle translation.
 *
 * - `context`: dialogue history, token estimation and context selection
 * - `prompts`: prompt templates and builders
 * - `core`: the per-session translator coordinating both endpoints
 */

pub use self::context::{ContextWindow, SubtitleHistory, TruncationMode, estimate_token_count};
pub use self::core::{EndpointState, SubtitleTranslator, TranslationResult, TranslationStats, TranslatorOptions};
pub use self::prompts::{PromptTemplate, SYSTEM_PROMPT, TranslationPromptBuilder};

pub mod context;
pub mod core;
pub mod prompts;

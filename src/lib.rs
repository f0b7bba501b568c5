/*!
 * # subctx - contextual subtitle translation
 *
 * Translates subtitle dialogue one line at a time through an
 * OpenAI-compatible chat API, carrying a token-budgeted window of recent
 * dialogue as context.
 *
 * ## Features
 *
 * - Rolling dialogue history with drop-oldest or smart-trim context selection
 * - Prompt-caching `/responses` endpoint with automatic, permanent fallback
 *   to `/chat/completions`
 * - Configurable retry policy with fixed inter-attempt delay
 * - Per-model token ceilings resolved from ordered rules
 * - SRT input and output, optionally keeping the original lines
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management and the login-string shorthand
 * - `model_limits`: Per-model token ceilings
 * - `translation`: Context window, prompts and the per-session translator
 * - `providers`: HTTP client, retry policy and the two endpoint protocols
 * - `subtitle_processor`: SRT parsing and rendering
 * - `app_controller`: File-level driver with progress reporting
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod model_limits;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{ApiError, ApiErrorKind, AppError, ConfigError, SubtitleError};
pub use providers::{ApiClient, CacheMode, RetryMode, TranslationEndpoint};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::{SubtitleTranslator, TranslationResult};
